use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::app_dirs::AppDirs;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to access history log: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to read history log: {0}")]
    Csv(#[from] csv::Error),
}

/// One finished session, as logged to the history csv.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub finished_at: DateTime<Local>,
    pub deck: String,
    pub group: Option<String>,
    pub mode: String,
    pub total: usize,
    pub learned: usize,
    pub misses: usize,
    pub duration_secs: u64,
}

/// Append-only csv log of finished sessions.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::history_path().unwrap_or_else(|| PathBuf::from("flick_history.csv"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, record: &SessionRecord) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Emit the header only when the file is created fresh
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        Ok(())
    }

    /// The most recent `n` records, newest last.
    pub fn recent(&self, n: usize) -> Result<Vec<SessionRecord>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for result in reader.deserialize() {
            let record: SessionRecord = result?;
            records.push(record);
        }

        let skip = records.len().saturating_sub(n);
        Ok(records.split_off(skip))
    }
}
