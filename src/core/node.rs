// src/core/node.rs

//! Per-node deployment parameters, derived purely from the options and the address list.

use crate::config::{DeploymentOptions, keys};
use crate::core::ring;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Node-scoped property keys added on top of [`DeploymentOptions::to_properties`].
pub mod node_keys {
    pub const INDEX: &str = "node.index";
    pub const DIR: &str = "node.dir";
    pub const HOSTNAME: &str = "hostname";
    pub const LISTEN_ADDRESS: &str = "listen.address";
    pub const RPC_ADDRESS: &str = "rpc.address";
    pub const INITIAL_TOKEN: &str = "initial.token";
    pub const DATA_DIR: &str = "data.dir";
    pub const COMMITLOG_DIR: &str = "commitlog.dir";
    pub const SAVED_CACHES_DIR: &str = "saved-caches.dir";
    pub const LOG_FILE: &str = "log.file";
}

/// The fully computed configuration of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    /// 0-based position of the node in the ring.
    pub index: usize,
    pub address: String,
    pub jmx_port: u16,
    pub initial_token: u128,
    /// Every other node's address, in ring order.
    pub seeds: Vec<String>,
    pub deploy_dir: PathBuf,
}

/// A node that has been (or, for an existing install, was previously) deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDir {
    pub index: usize,
    pub address: String,
    pub path: PathBuf,
}

/// Returns `cluster_dir/node{index}`.
pub fn node_dir_path(cluster_dir: &Path, index: usize) -> PathBuf {
    cluster_dir.join(format!("node{index}"))
}

/// Lists the node directories of a cluster without touching the filesystem.
pub fn node_dirs(cluster_dir: &Path, addresses: &[String]) -> Vec<NodeDir> {
    addresses
        .iter()
        .enumerate()
        .map(|(index, address)| NodeDir {
            index,
            address: address.clone(),
            path: node_dir_path(cluster_dir, index),
        })
        .collect()
}

impl NodeSpec {
    /// Computes the spec of node `index`.
    ///
    /// `addresses` must hold every node's address in ring order and `options` must
    /// have been validated. No I/O is performed, so specs for different nodes can be
    /// computed independently.
    pub fn compute(index: usize, options: &DeploymentOptions, addresses: &[String]) -> Self {
        let address = addresses[index].clone();
        let seeds = addresses
            .iter()
            .filter(|peer| **peer != address)
            .cloned()
            .collect();
        Self {
            index,
            address,
            jmx_port: options.jmx_port() + index as u16,
            initial_token: ring::initial_token(index + 1, addresses.len()),
            seeds,
            deploy_dir: node_dir_path(&options.cluster_dir(), index),
        }
    }

    /// Builds the property set used to materialize this node's installation.
    pub fn properties(&self, options: &DeploymentOptions) -> BTreeMap<String, String> {
        let mut props = options.to_properties();
        let dir = self.deploy_dir.display().to_string();
        let seeds = if self.seeds.is_empty() {
            // A lone node has to seed itself.
            self.address.clone()
        } else {
            self.seeds.join(",")
        };

        props.insert(node_keys::INDEX.to_string(), self.index.to_string());
        props.insert(node_keys::DIR.to_string(), dir);
        props.insert(node_keys::HOSTNAME.to_string(), self.address.clone());
        props.insert(node_keys::LISTEN_ADDRESS.to_string(), self.address.clone());
        props.insert(node_keys::RPC_ADDRESS.to_string(), self.address.clone());
        props.insert(keys::SEEDS.to_string(), seeds);
        props.insert(keys::JMX_PORT.to_string(), self.jmx_port.to_string());
        if options.num_tokens() == 1 {
            props.insert(
                node_keys::INITIAL_TOKEN.to_string(),
                self.initial_token.to_string(),
            );
        }
        for (key, sub) in [
            (node_keys::DATA_DIR, "data"),
            (node_keys::COMMITLOG_DIR, "commit_log"),
            (node_keys::SAVED_CACHES_DIR, "saved_caches"),
            (node_keys::LOG_FILE, "logs/storage.log"),
        ] {
            props.insert(
                key.to_string(),
                self.deploy_dir.join(sub).display().to_string(),
            );
        }
        props
    }

    pub fn node_dir(&self) -> NodeDir {
        NodeDir {
            index: self.index,
            address: self.address.clone(),
            path: self.deploy_dir.clone(),
        }
    }
}
