// src/orchestrator/mod.rs

//! The top-level cluster bootstrap: install, start, verify, publish.

pub mod publish;

pub use publish::{HostListPublisher, TomlFileUpdate};

use crate::config::DeploymentOptions;
use crate::core::deploy::{BootstrapDeployer, LaunchOutcome, NodeLauncher, ScriptLauncher};
use crate::core::errors::OrchestrationError;
use crate::core::node::NodeDir;
use crate::core::probe::{ClusterInitService, SchemaMetadata, TcpProbe};
use crate::core::ring;
use std::sync::Arc;
use tracing::{info, warn};

/// The result of issuing start commands to a set of nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartSummary {
    /// Indexes of nodes whose start command was issued.
    pub started: Vec<usize>,
    /// Indexes of nodes that were already running.
    pub already_running: Vec<usize>,
    /// Indexes of nodes whose start command failed.
    pub failed: Vec<usize>,
}

impl StartSummary {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Owns the deployment options and drives a full bootstrap.
pub struct ClusterManager {
    options: DeploymentOptions,
    deployer: BootstrapDeployer,
    launcher: Arc<dyn NodeLauncher>,
    init_service: ClusterInitService,
    schema: Option<Arc<dyn SchemaMetadata>>,
    publisher: Option<Arc<dyn HostListPublisher>>,
}

impl ClusterManager {
    /// Creates a manager with the stock collaborators: directory bundle, template
    /// installer, script launcher and a TCP probe on the RPC port.
    pub fn new(options: DeploymentOptions) -> Self {
        let launcher: Arc<dyn NodeLauncher> = Arc::new(ScriptLauncher::from_options(&options));
        let deployer = BootstrapDeployer::with_launcher(launcher.clone());
        let init_service = ClusterInitService::new(Arc::new(TcpProbe::new(options.rpc_port())));
        Self::with_parts(options, deployer, launcher, init_service)
    }

    /// Creates a manager from explicit collaborators.
    ///
    /// `launcher` should be the one the deployer uses, so that nodes started during
    /// the deploy are not started a second time.
    pub fn with_parts(
        options: DeploymentOptions,
        deployer: BootstrapDeployer,
        launcher: Arc<dyn NodeLauncher>,
        init_service: ClusterInitService,
    ) -> Self {
        Self {
            options,
            deployer,
            launcher,
            init_service,
            schema: None,
            publisher: None,
        }
    }

    pub fn with_schema_metadata(mut self, schema: Arc<dyn SchemaMetadata>) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn HostListPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn options(&self) -> &DeploymentOptions {
        &self.options
    }

    /// Installs the cluster. External clusters have nothing to install.
    pub async fn install_cluster(&self) -> Result<Vec<NodeDir>, OrchestrationError> {
        if !self.options.embedded() {
            info!("Cluster is not embedded. Nothing to install.");
            return Ok(Vec::new());
        }
        Ok(self.deployer.deploy(&self.options).await?)
    }

    /// Issues the start command of every node.
    ///
    /// Failures are logged and recorded in the summary; they never abort the loop.
    pub async fn start_cluster(&self, nodes: &[NodeDir]) -> StartSummary {
        let mut summary = StartSummary::default();
        for node in nodes {
            match self.launcher.launch(node).await {
                Ok(LaunchOutcome::Started { .. }) => summary.started.push(node.index),
                Ok(LaunchOutcome::AlreadyRunning) => summary.already_running.push(node.index),
                Err(e) => {
                    warn!(
                        "Failed to start node{} at {} ({}): {}",
                        node.index,
                        node.address,
                        node.path.display(),
                        e
                    );
                    summary.failed.push(node.index);
                }
            }
        }
        if !summary.all_ok() {
            warn!(
                "{} of {} node(s) failed to start: {:?}",
                summary.failed.len(),
                nodes.len(),
                summary.failed
            );
        }
        summary
    }

    /// The cluster's host addresses, in ring order.
    pub fn host_names(&self) -> Vec<String> {
        if self.options.embedded() {
            ring::node_addresses(self.options.num_nodes())
        } else {
            self.options.seeds()
        }
    }

    /// Runs the complete bootstrap and returns the published host list.
    ///
    /// With `cluster.auto-deploy` disabled nothing is installed or started. With
    /// `cluster.verify-timeout-ms` set, every host must answer the liveness probe
    /// (and agree on a schema version, if a metadata source is attached) in time.
    pub async fn run(&self) -> Result<Vec<String>, OrchestrationError> {
        let hosts = self.host_names();

        if self.options.auto_deploy() {
            let nodes = self.install_cluster().await?;
            let summary = self.start_cluster(&nodes).await;
            info!(
                "Start commands issued: {} started, {} already running, {} failed",
                summary.started.len(),
                summary.already_running.len(),
                summary.failed.len()
            );
        } else {
            info!("Auto-deploy is disabled. Skipping cluster installation.");
        }

        if let Some(timeout) = self.options.verify_timeout() {
            self.verify(&hosts, timeout).await?;
        }

        if let Some(publisher) = &self.publisher {
            publisher.publish(&hosts).await?;
        }
        Ok(hosts)
    }

    async fn verify(
        &self,
        hosts: &[String],
        timeout: std::time::Duration,
    ) -> Result<(), OrchestrationError> {
        if hosts.is_empty() {
            warn!("No cluster hosts are configured. Skipping verification.");
            return Ok(());
        }
        self.init_service
            .wait_for_cluster_to_start(hosts, None, timeout)
            .await?;
        if let Some(schema) = &self.schema {
            let version = self
                .init_service
                .wait_for_schema_agreement(schema.as_ref(), hosts, timeout)
                .await?;
            info!("Cluster converged on schema version {}", version);
        }
        Ok(())
    }
}
