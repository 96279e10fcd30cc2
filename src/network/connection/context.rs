//! Shared, per-server state handed to every connection task.

use crate::config::Config;
use crate::handlers::Registry;
use crate::state::CoordinatorHandle;
use crate::storage::MetricsStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Session limits resolved from configuration once at startup.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub max_message_len: usize,
    pub idle_timeout: Duration,
    pub outbound_queue: usize,
    pub log_dir: PathBuf,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_message_len: config.limits.max_message_len,
            idle_timeout: config.limits.idle_timeout(),
            outbound_queue: config.limits.outbound_queue,
            log_dir: PathBuf::from(&config.storage.log_dir),
        }
    }
}

/// Everything a connection needs besides its own transport.
#[derive(Clone)]
pub struct ServerContext {
    pub coordinator: CoordinatorHandle,
    pub registry: Arc<Registry>,
    pub metrics_store: Arc<dyn MetricsStore>,
    pub settings: Arc<SessionSettings>,
}
