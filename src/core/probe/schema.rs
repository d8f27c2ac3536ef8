// src/core/probe/schema.rs

//! Schema-version agreement across the cluster.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// The storage engine's cluster-metadata endpoint.
#[async_trait]
pub trait SchemaMetadata: Send + Sync {
    /// Returns a mapping of schema version to the hosts currently reporting it.
    async fn schema_versions(&self) -> anyhow::Result<HashMap<String, Vec<String>>>;
}

/// Returns the agreed version if exactly one version is reported and the hosts
/// reporting it are exactly `expected`.
pub fn agreed_version(
    versions: &HashMap<String, Vec<String>>,
    expected: &HashSet<&str>,
) -> Option<String> {
    if versions.len() != 1 {
        return None;
    }
    let (version, hosts) = versions.iter().next()?;
    let reporting: HashSet<&str> = hosts.iter().map(String::as_str).collect();
    (reporting == *expected).then(|| version.clone())
}
