// src/orchestrator/publish.rs

//! Publishes the cluster host list into the external system configuration.

use crate::core::errors::PublishError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// The key under which the host list is published by default.
pub const DEFAULT_HOSTS_KEY: &str = "cluster.seeds";

/// A side-effecting sink that lets other components discover the cluster.
#[async_trait]
pub trait HostListPublisher: Send + Sync {
    async fn publish(&self, hosts: &[String]) -> Result<(), PublishError>;
}

/// Sets one dotted key of an existing TOML file to the comma-joined host list.
///
/// Intermediate tables are created as needed; all other keys are left untouched.
#[derive(Debug, Clone)]
pub struct TomlFileUpdate {
    path: PathBuf,
    key: String,
}

impl TomlFileUpdate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: DEFAULT_HOSTS_KEY.to_string(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PublishError {
        PublishError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl HostListPublisher for TomlFileUpdate {
    async fn publish(&self, hosts: &[String]) -> Result<(), PublishError> {
        let contents = fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        let mut table: toml::Table =
            toml::from_str(&contents).map_err(|e| PublishError::Parse {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        let value = toml::Value::String(hosts.join(","));
        set_dotted(&mut table, &self.key, value).ok_or_else(|| PublishError::KeyConflict {
            path: self.path.clone(),
            key: self.key.clone(),
        })?;

        let updated = toml::to_string(&table).map_err(|e| PublishError::Serialize {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&self.path, updated)
            .await
            .map_err(|e| self.io_error(e))?;
        info!(
            "Published {} host(s) as '{}' in {}",
            hosts.len(),
            self.key,
            self.path.display()
        );
        Ok(())
    }
}

/// Sets `key` (split on '.') in `table`. Returns `None` if a prefix of the key is
/// already bound to a non-table value.
fn set_dotted(table: &mut toml::Table, key: &str, value: toml::Value) -> Option<()> {
    let (parents, leaf) = match key.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, key),
    };
    let mut current = table;
    if let Some(parents) = parents {
        for segment in parents.split('.') {
            current = current
                .entry(segment.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()))
                .as_table_mut()?;
        }
    }
    current.insert(leaf.to_string(), value);
    Some(())
}
