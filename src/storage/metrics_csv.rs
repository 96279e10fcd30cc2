//! CSV-backed metrics record store.

use super::MetricsStore;
use crate::error::StorageError;
use crate::state::SessionRecord;
use async_trait::async_trait;
use chrono::SecondsFormat;
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Header row, written when the file is missing or empty.
pub const CSV_HEADER: &str = "Client,SentMessages,ReceivedMessages,PacketLoss(%),Throughput(msg/sec),SessionDuration(seconds),Latency(ms),Timestamp";

/// Appends one row per finished session to a CSV file.
///
/// The check-for-header and append happen under one lock so two sessions
/// ending together cannot both decide to write the header.
#[derive(Debug, Clone)]
pub struct CsvMetricsStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl CsvMetricsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }
}

#[async_trait]
impl MetricsStore for CsvMetricsStore {
    async fn append_record(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let row = format_row(record);
        let path = self.path.clone();
        let lock = Arc::clone(&self.lock);

        tokio::task::spawn_blocking(move || {
            let _guard = lock.lock();
            append_row(&path, &row)
        })
        .await??;

        Ok(())
    }
}

fn append_row(path: &Path, row: &str) -> Result<(), StorageError> {
    let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut buf = String::with_capacity(CSV_HEADER.len() + row.len() + 2);
    if needs_header {
        buf.push_str(CSV_HEADER);
        buf.push('\n');
    }
    buf.push_str(row);
    buf.push('\n');

    file.write_all(buf.as_bytes())?;
    Ok(())
}

/// Format a record as one CSV row (no trailing newline).
pub fn format_row(record: &SessionRecord) -> String {
    format!(
        "{},{},{},{:.2},{:.2},{:.2},{:.2},{}",
        record.identity,
        record.sent,
        record.acknowledged,
        record.packet_loss,
        record.throughput,
        record.duration_secs,
        record.latency_ms,
        record.recorded_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}
