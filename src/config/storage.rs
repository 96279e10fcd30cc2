//! Storage locations for the per-session log and the metrics record store.

use serde::Deserialize;

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one append-only log file per client endpoint.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// CSV file receiving one row per finished session.
    #[serde(default = "default_metrics_file")]
    pub metrics_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            metrics_file: default_metrics_file(),
        }
    }
}

fn default_log_dir() -> String {
    "client_logs".to_string()
}

fn default_metrics_file() -> String {
    "client_metrics.csv".to_string()
}
