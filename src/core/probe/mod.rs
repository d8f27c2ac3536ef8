// src/core/probe/mod.rs

//! Liveness and convergence probing for a freshly started cluster.
//!
//! Both probes poll at a fixed interval because the storage engine has no
//! notification channel that is usable while it is still starting. Every wait takes
//! an explicit timeout and ends with [`ProbeError::Timeout`] once it passes.

pub mod schema;
pub mod tcp;

pub use schema::SchemaMetadata;
pub use tcp::TcpProbe;

use crate::core::errors::ProbeError;
use async_trait::async_trait;
use indexmap::IndexSet;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::{debug, info, instrument, warn};

/// The delay between two consecutive probe attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The outcome of a single liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Ready,
    /// The node is not accepting connections yet. Expected while it boots.
    NotReady,
    /// The probe failed for a reason other than the node still starting.
    Error(String),
}

/// A cheap round-trip against a single host.
#[async_trait]
pub trait NodeProbe: Send + Sync {
    async fn probe(&self, host: &str) -> ProbeResult;
}

/// Stateless probing of node liveness and schema convergence.
#[derive(Clone)]
pub struct ClusterInitService {
    probe: Arc<dyn NodeProbe>,
    poll_interval: Duration,
}

impl ClusterInitService {
    pub fn new(probe: Arc<dyn NodeProbe>) -> Self {
        Self {
            probe,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Waits until `required` distinct hosts answer the liveness probe.
    ///
    /// Hosts are probed from a FIFO queue; a host that is not ready goes to the back
    /// so one slow node does not block the others. With `required = None` every host
    /// must answer. Returns the hosts that answered, in the order they did.
    #[instrument(skip(self, hosts), fields(hosts = hosts.len()))]
    pub async fn wait_for_cluster_to_start(
        &self,
        hosts: &[String],
        required: Option<usize>,
        timeout: Duration,
    ) -> Result<Vec<String>, ProbeError> {
        let unique: IndexSet<&str> = hosts.iter().map(String::as_str).collect();
        let required = required.unwrap_or(unique.len());
        if required == 0 || required > unique.len() {
            return Err(ProbeError::InvalidRequest(format!(
                "cannot wait for {} of {} host(s)",
                required,
                unique.len()
            )));
        }

        let started = Instant::now();
        let deadline = started + timeout;
        let mut queue: VecDeque<&str> = unique.into_iter().collect();
        let mut ready = Vec::with_capacity(required);

        while let Some(host) = queue.pop_front() {
            let result = match time::timeout_at(deadline, self.probe.probe(host)).await {
                Ok(result) => result,
                Err(_) => {
                    queue.push_front(host);
                    return Err(liveness_timeout(started, &queue));
                }
            };

            match result {
                ProbeResult::Ready => {
                    debug!("{} is up", host);
                    ready.push(host.to_string());
                    if ready.len() >= required {
                        info!(
                            "{} of {} host(s) answered after {:?}",
                            ready.len(),
                            hosts.len(),
                            started.elapsed()
                        );
                        return Ok(ready);
                    }
                }
                ProbeResult::NotReady => {
                    debug!("{} is not up yet", host);
                    queue.push_back(host);
                }
                ProbeResult::Error(reason) => {
                    warn!("Probe of {} failed: {}", host, reason);
                    queue.push_back(host);
                }
            }

            if Instant::now() >= deadline {
                return Err(liveness_timeout(started, &queue));
            }
            time::sleep(self.poll_interval).await;
        }

        Ok(ready)
    }

    /// Waits until every host in `hosts` reports one and the same schema version.
    ///
    /// Metadata query failures are logged and retried. Returns the agreed version.
    #[instrument(skip(self, metadata, hosts), fields(hosts = hosts.len()))]
    pub async fn wait_for_schema_agreement(
        &self,
        metadata: &dyn SchemaMetadata,
        hosts: &[String],
        timeout: Duration,
    ) -> Result<String, ProbeError> {
        if hosts.is_empty() {
            return Err(ProbeError::InvalidRequest(
                "schema agreement needs at least one host".to_string(),
            ));
        }
        let expected: HashSet<&str> = hosts.iter().map(String::as_str).collect();
        let started = Instant::now();
        let deadline = started + timeout;
        let mut last_seen: HashMap<String, Vec<String>> = HashMap::new();

        loop {
            match time::timeout_at(deadline, metadata.schema_versions()).await {
                Ok(Ok(versions)) => {
                    if let Some(version) = schema::agreed_version(&versions, &expected) {
                        info!(
                            "Schema agreement on version {} after {:?}",
                            version,
                            started.elapsed()
                        );
                        return Ok(version);
                    }
                    debug!("No schema agreement yet: {:?}", versions);
                    last_seen = versions;
                }
                Ok(Err(e)) => warn!("Failed to query schema versions: {}", e),
                Err(_) => return Err(schema_timeout(started, &expected, &last_seen)),
            }

            if Instant::now() >= deadline {
                return Err(schema_timeout(started, &expected, &last_seen));
            }
            time::sleep(self.poll_interval).await;
        }
    }
}

fn liveness_timeout(started: Instant, queue: &VecDeque<&str>) -> ProbeError {
    ProbeError::Timeout {
        operation: "cluster start",
        waited: started.elapsed(),
        pending: queue.iter().map(|h| h.to_string()).collect(),
    }
}

/// Hosts outside the largest reporting group are the ones still pending.
fn schema_timeout(
    started: Instant,
    expected: &HashSet<&str>,
    last_seen: &HashMap<String, Vec<String>>,
) -> ProbeError {
    let majority: HashSet<&str> = last_seen
        .values()
        .max_by_key(|hosts| hosts.len())
        .map(|hosts| hosts.iter().map(String::as_str).collect())
        .unwrap_or_default();
    let mut pending: Vec<String> = expected
        .iter()
        .filter(|h| !majority.contains(**h))
        .map(|h| h.to_string())
        .collect();
    pending.sort();
    ProbeError::Timeout {
        operation: "schema agreement",
        waited: started.elapsed(),
        pending,
    }
}
