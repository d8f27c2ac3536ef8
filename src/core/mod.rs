// src/core/mod.rs

//! The core bootstrap logic: ring math, per-node specs, deployment and probing.

pub mod deploy;
pub mod errors;
pub mod node;
pub mod probe;
pub mod ring;

pub use deploy::BootstrapDeployer;
pub use errors::{ConfigError, DeployError, OrchestrationError, ProbeError, PublishError};
pub use node::{NodeDir, NodeSpec};
pub use probe::{ClusterInitService, ProbeResult};
