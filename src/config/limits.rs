//! Per-session limits configuration.

use serde::Deserialize;
use std::time::Duration;

/// Per-session limits and queue depths.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum accepted line length in bytes (default: 1024).
    /// Longer lines are truncated and the sender is warned.
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
    /// Seconds of silence before a session is disconnected (default: 60).
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: u64,
    /// Broadcast messages buffered per session before deliveries are dropped (default: 256).
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
    /// Coordinator mailbox capacity (default: 1024).
    #[serde(default = "default_coordinator_queue")]
    pub coordinator_queue: usize,
}

impl LimitsConfig {
    /// The inactivity window as a [`Duration`].
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout)
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_message_len: default_max_message_len(),
            idle_timeout: default_idle_timeout(),
            outbound_queue: default_outbound_queue(),
            coordinator_queue: default_coordinator_queue(),
        }
    }
}

fn default_max_message_len() -> usize {
    1024
}

fn default_idle_timeout() -> u64 {
    60
}

fn default_outbound_queue() -> usize {
    256
}

fn default_coordinator_queue() -> usize {
    1024
}
