//! Storage collaborators used by the session loop.
//!
//! - [`SessionLog`]: append-only per-client text log.
//! - [`MetricsStore`]: durable sink for one [`SessionRecord`] per finished session,
//!   with [`CsvMetricsStore`] as the file-backed implementation.
//!
//! Failures here are never fatal to a session; callers log and continue.

mod metrics_csv;
mod session_log;

pub use metrics_csv::CsvMetricsStore;
pub use session_log::SessionLog;

use crate::error::StorageError;
use crate::state::SessionRecord;
use async_trait::async_trait;

/// Destination for finished-session metrics.
#[async_trait]
pub trait MetricsStore: Send + Sync {
    /// Append one record. Implementations must not rewrite earlier records.
    async fn append_record(&self, record: &SessionRecord) -> Result<(), StorageError>;
}
