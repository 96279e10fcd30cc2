//! Network listener configuration.

use serde::Deserialize;
use std::net::SocketAddr;

/// TCP listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:9000").
    #[serde(default = "default_listen_address")]
    pub address: SocketAddr,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_listen_address(),
        }
    }
}

fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 9000))
}

/// UDP relay configuration.
///
/// Peers are tracked by source address and evicted by a periodic sweep once
/// they have been silent for longer than `limits.idle_timeout`.
#[derive(Debug, Clone, Deserialize)]
pub struct UdpConfig {
    /// Address to bind to (e.g., "0.0.0.0:8080").
    #[serde(default = "default_udp_address")]
    pub address: SocketAddr,
    /// Seconds between peer sweeps (default: 30).
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: u64,
}

fn default_udp_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_sweep_interval() -> u64 {
    30
}
