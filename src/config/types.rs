//! Core configuration types and loading.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use thiserror::Error;

use super::limits::LimitsConfig;
use super::listen::{ListenConfig, UdpConfig};
use super::storage::StorageConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
///
/// Every section has defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server information.
    #[serde(default)]
    pub server: ServerConfig,
    /// TCP listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Per-session limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Session log and metrics file locations.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Optional UDP relay. Absent means the relay is not started.
    pub udp: Option<UdpConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing.
    ///
    /// Parse errors and other I/O errors are still reported.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(&path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.as_ref().display(),
                    "Config file not found, using defaults"
                );
                Ok(Self::default())
            }
            other => other,
        }
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name, used in log output.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Prometheus metrics HTTP port. `0` disables the endpoint.
    #[serde(default)]
    pub metrics_port: u16,
    /// Interface the metrics endpoint binds to (default: all interfaces).
    #[serde(default = "default_metrics_bind")]
    pub metrics_bind: IpAddr,
}

impl ServerConfig {
    /// Address of the HTTP endpoint, or `None` when it is disabled.
    pub fn metrics_address(&self) -> Option<SocketAddr> {
        (self.metrics_port != 0).then(|| SocketAddr::new(self.metrics_bind, self.metrics_port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            metrics_port: 0,
            metrics_bind: default_metrics_bind(),
        }
    }
}

fn default_server_name() -> String {
    "linecast".to_string()
}

fn default_metrics_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}
