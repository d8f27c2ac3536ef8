// src/core/deploy/mod.rs

//! Provisions the nodes of an embedded cluster.
//!
//! A deploy purges the cluster directory, unpacks the bundle into a temporary work
//! directory, then installs and starts every node in ring order. The installed-marker
//! is written only once every node has had its start command issued, so an
//! interrupted deploy is retried from scratch on the next call.

pub mod bundle;
pub mod installer;
pub mod launcher;
mod tree;

pub use bundle::{BundleSource, DirectoryBundle};
pub use installer::{NodeInstaller, TemplateInstaller};
pub use launcher::{LaunchOutcome, NodeLauncher, ScriptLauncher};

use crate::config::DeploymentOptions;
use crate::core::errors::DeployError;
use crate::core::node::{self, NodeDir, NodeSpec};
use crate::core::ring;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

/// The sentinel file whose existence means the cluster is already installed.
pub const INSTALLED_MARKER: &str = ".installed";

/// The summary written into the installed-marker. Only the file's existence matters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallSummary {
    pub installed_at: String,
    pub num_nodes: usize,
    pub hosts: Vec<String>,
}

/// Returns `<cluster_dir>/.installed`.
pub fn marker_path(cluster_dir: &Path) -> PathBuf {
    cluster_dir.join(INSTALLED_MARKER)
}

/// Drives per-node configuration, installation and start.
#[derive(Clone)]
pub struct BootstrapDeployer {
    bundle: Arc<dyn BundleSource>,
    installer: Arc<dyn NodeInstaller>,
    launcher: Arc<dyn NodeLauncher>,
}

impl BootstrapDeployer {
    pub fn new(
        bundle: Arc<dyn BundleSource>,
        installer: Arc<dyn NodeInstaller>,
        launcher: Arc<dyn NodeLauncher>,
    ) -> Self {
        Self {
            bundle,
            installer,
            launcher,
        }
    }

    /// A deployer using the directory bundle and the template installer.
    pub fn with_launcher(launcher: Arc<dyn NodeLauncher>) -> Self {
        Self::new(
            Arc::new(DirectoryBundle),
            Arc::new(TemplateInstaller),
            launcher,
        )
    }

    /// Installs and starts every node unless the cluster is already installed.
    ///
    /// Returns the node directories in ring order. When the installed-marker is
    /// present nothing on disk is touched and no node is started.
    #[instrument(skip_all, fields(cluster_dir = %options.cluster_dir().display()))]
    pub async fn deploy(&self, options: &DeploymentOptions) -> Result<Vec<NodeDir>, DeployError> {
        options.validate()?;
        let cluster_dir = options.cluster_dir();
        let addresses = ring::node_addresses(options.num_nodes());
        let marker = marker_path(&cluster_dir);

        let installed = fs::try_exists(&marker).await.map_err(|e| {
            DeployError::io(format!("Failed to check '{}'", marker.display()), e)
        })?;
        if installed {
            info!(
                "Cluster in '{}' is already installed. Skipping deployment.",
                cluster_dir.display()
            );
            return Ok(node::node_dirs(&cluster_dir, &addresses));
        }

        purge(&cluster_dir).await?;

        let work_dir = tempfile::Builder::new()
            .prefix("ringforge-bundle-")
            .tempdir()
            .map_err(|e| DeployError::io("Failed to create bundle work directory", e))?;

        let result = self
            .provision(options, &addresses, work_dir.path(), &marker)
            .await;

        let work_path = work_dir.path().to_path_buf();
        match work_dir.close() {
            Ok(()) => debug!("Removed bundle work directory {}", work_path.display()),
            Err(e) => warn!(
                "Failed to remove bundle work directory {}: {}",
                work_path.display(),
                e
            ),
        }

        result
    }

    /// Unpacks the bundle, installs and starts each node, then writes the marker.
    async fn provision(
        &self,
        options: &DeploymentOptions,
        addresses: &[String],
        work_dir: &Path,
        marker: &Path,
    ) -> Result<Vec<NodeDir>, DeployError> {
        let template_dir =
            self.bundle
                .unpack(options, work_dir)
                .await
                .map_err(|source| DeployError::Bundle {
                    bundle: options.bundle_file_name().display().to_string(),
                    source,
                })?;

        let mut nodes = Vec::with_capacity(addresses.len());
        for index in 0..addresses.len() {
            let spec = NodeSpec::compute(index, options, addresses);
            let properties = spec.properties(options);
            debug!(
                "node{}: address={} jmx_port={} token={} seeds={:?}",
                spec.index, spec.address, spec.jmx_port, spec.initial_token, spec.seeds
            );

            self.installer
                .install(&template_dir, &spec, &properties)
                .await
                .map_err(|source| DeployError::Install {
                    node: index,
                    path: spec.deploy_dir.clone(),
                    source,
                })?;

            let node_dir = spec.node_dir();
            if let Err(e) = self.launcher.launch(&node_dir).await {
                warn!(
                    "Failed to issue start command for node{} at {}: {}",
                    index, node_dir.address, e
                );
            }
            nodes.push(node_dir);
        }

        write_marker(marker, addresses).await?;
        info!(
            "Installed {} node(s): {}",
            nodes.len(),
            addresses.join(", ")
        );
        Ok(nodes)
    }
}

/// Removes any previous state in `cluster_dir` and recreates it empty.
async fn purge(cluster_dir: &Path) -> Result<(), DeployError> {
    let exists = fs::try_exists(cluster_dir).await.map_err(|e| {
        DeployError::io(format!("Failed to check '{}'", cluster_dir.display()), e)
    })?;
    if exists {
        info!("Purging previous cluster state in {}", cluster_dir.display());
        fs::remove_dir_all(cluster_dir).await.map_err(|e| {
            DeployError::io(format!("Failed to purge '{}'", cluster_dir.display()), e)
        })?;
    }
    fs::create_dir_all(cluster_dir).await.map_err(|e| {
        DeployError::io(format!("Failed to create '{}'", cluster_dir.display()), e)
    })
}

/// Creates the marker with `create_new`, so a concurrent deploy cannot also succeed.
async fn write_marker(marker: &Path, hosts: &[String]) -> Result<(), DeployError> {
    let summary = InstallSummary {
        installed_at: chrono::Utc::now().to_rfc3339(),
        num_nodes: hosts.len(),
        hosts: hosts.to_vec(),
    };
    let to_marker_error = |source| DeployError::Marker {
        path: marker.to_path_buf(),
        source,
    };
    let body = serde_json::to_vec_pretty(&summary)
        .map_err(|e| to_marker_error(std::io::Error::other(e)))?;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(marker)
        .await
        .map_err(to_marker_error)?;
    file.write_all(&body).await.map_err(to_marker_error)?;
    file.sync_all().await.map_err(to_marker_error)?;
    Ok(())
}
