// src/lib.rs

pub mod config;
pub mod core;
pub mod orchestrator;

// Re-export
pub use crate::orchestrator::ClusterManager;
