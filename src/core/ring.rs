// src/core/ring.rs

//! Token-ring partitioning and loopback address synthesis for embedded clusters.

use std::net::Ipv4Addr;

/// The size of the token ring, matching a 127-bit random partitioner keyspace.
pub const RING_SIZE: u128 = 1 << 127;

/// The width of each node's range when the ring is split into `num_nodes` parts.
///
/// # Panics
///
/// Panics if `num_nodes` is 0. Options are validated before any token is computed.
pub fn partition_width(num_nodes: usize) -> u128 {
    RING_SIZE / num_nodes as u128
}

/// Calculates the initial token for the node at 1-indexed ring `position`.
///
/// The formula is `floor(2^127 / num_nodes) * position`, which splits the ring into
/// `num_nodes` contiguous, equally sized ranges. The last node's token is at most
/// `2^127`, so the product never overflows a `u128`.
pub fn initial_token(position: usize, num_nodes: usize) -> u128 {
    partition_width(num_nodes) * position as u128
}

/// Returns the loopback address of the node with 0-based `index`: `127.0.0.{index + 1}`.
pub fn node_address(index: usize) -> Ipv4Addr {
    debug_assert!(index < 254, "embedded clusters are limited to 254 nodes");
    Ipv4Addr::new(127, 0, 0, (index + 1) as u8)
}

/// Synthesizes one loopback address per node, in ring order.
pub fn node_addresses(num_nodes: usize) -> Vec<String> {
    (0..num_nodes).map(|i| node_address(i).to_string()).collect()
}
