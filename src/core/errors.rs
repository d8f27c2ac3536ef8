// src/core/errors.rs

//! Defines the error types for configuration, deployment, probing and orchestration.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A malformed or unreadable configuration value. Never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read deployment properties from '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse deployment properties from '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Property '{key}' must be an integer, got '{value}'")]
    InvalidInteger { key: String, value: String },

    #[error("Property '{key}' must be a boolean, got '{value}'")]
    InvalidBool { key: String, value: String },

    #[error("Invalid deployment options: {0}")]
    Invalid(String),
}

/// A failure while provisioning the cluster. The installed-marker is never written
/// when one of these is returned, so the next deploy starts from scratch.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to unpack bundle '{bundle}': {source}")]
    Bundle {
        bundle: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install node{node} into '{path}': {source}")]
    Install {
        node: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write installed-marker '{path}': {source}")]
    Marker {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DeployError {
    /// Wraps an I/O error with a short description of the step that failed.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        DeployError::Io {
            context: context.into(),
            source,
        }
    }
}

/// A liveness or schema-agreement probe that could not complete.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Timed out after {waited:?} waiting for {operation}; still pending: {pending:?}")]
    Timeout {
        operation: &'static str,
        waited: Duration,
        pending: Vec<String>,
    },

    #[error("Invalid probe request: {0}")]
    InvalidRequest(String),
}

/// A failure while writing the host list into the external configuration store.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Key '{key}' conflicts with a non-table value in '{path}'")]
    KeyConflict { path: PathBuf, key: String },

    #[error("Failed to serialize '{path}': {message}")]
    Serialize { path: PathBuf, message: String },
}

/// The top-level error of a cluster bootstrap run.
#[derive(Error, Debug)]
pub enum OrchestrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cluster installation failed: {0}")]
    Deploy(#[from] DeployError),

    #[error("Cluster verification failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("Failed to publish cluster hosts: {0}")]
    Publish(#[from] PublishError),
}
