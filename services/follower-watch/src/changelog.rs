//! Append-only change and error records
//!
//! One JSON object per line, never rewritten. Nothing in the process
//! reads these back; they are an operational record only, so append
//! failures are surfaced to the caller and otherwise ignored.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use common::FollowerRecord;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

/// One detected follower change, created once and appended.
#[derive(Debug, Serialize)]
pub struct ChangeEvent {
    pub timestamp: DateTime<Utc>,
    pub followers: u64,
    pub added: Vec<FollowerRecord>,
    pub removed: Vec<FollowerRecord>,
}

/// Appender for the change and error record files.
#[derive(Debug, Clone)]
pub struct ChangeLog {
    change_path: PathBuf,
    error_path: PathBuf,
}

impl ChangeLog {
    pub fn new(change_path: PathBuf, error_path: PathBuf) -> Self {
        Self {
            change_path,
            error_path,
        }
    }

    /// Append one change event line.
    pub async fn record_change(&self, event: &ChangeEvent) -> std::io::Result<()> {
        let line = serde_json::to_string(event).map_err(std::io::Error::other)?;
        append_line(&self.change_path, &line).await
    }

    /// Append one unrecoverable-error line.
    pub async fn record_error(&self, error: &str) -> std::io::Result<()> {
        let line = serde_json::json!({
            "timestamp": Utc::now(),
            "error": error,
        })
        .to_string();
        append_line(&self.error_path, &line).await
    }
}

async fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .await?;
    file.write_all(format!("{line}\n").as_bytes()).await?;
    file.flush().await
}
