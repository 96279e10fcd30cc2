//! Per-session append-only log file.

use crate::error::StorageError;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Append-only log of every line a client sent, one file per remote endpoint.
///
/// Line format: `<rfc3339 timestamp>: <text>`.
#[derive(Debug)]
pub struct SessionLog {
    file: File,
    path: PathBuf,
}

impl SessionLog {
    /// Open (creating if needed) the log for `identity` inside `dir`.
    pub async fn open(dir: impl AsRef<Path>, identity: &str) -> Result<Self, StorageError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;

        let path = dir.join(file_name_for(identity));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self { file, path })
    }

    pub async fn append(&mut self, at: DateTime<Utc>, text: &str) -> Result<(), StorageError> {
        let line = format!("{}: {}\n", at.to_rfc3339_opts(SecondsFormat::Secs, true), text);
        self.file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered writes. Dropping the log closes the file either way.
    pub async fn close(mut self) -> Result<(), StorageError> {
        self.file.flush().await?;
        Ok(())
    }
}

/// `127.0.0.1:5000` → `127.0.0.1_5000.log`. IPv6 brackets are kept.
fn file_name_for(identity: &str) -> String {
    format!("{}.log", identity.replace(':', "_"))
}
