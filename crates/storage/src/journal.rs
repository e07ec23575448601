// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL alert journal.
//!
//! One serialized alert per line. The file is the system of record for
//! emitted alerts; readers must tolerate a partial trailing line from an
//! interrupted write.

use sentinel_core::Alert;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from journal operations
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Open handle to the alert journal, append-only.
pub struct AlertJournal {
    file: File,
    path: PathBuf,
}

impl AlertJournal {
    /// Open or create the journal, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<Self, JournalError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file,
            path: path.to_owned(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one alert as a single line and flush it.
    pub fn append(&mut self, alert: &Alert) -> Result<(), JournalError> {
        let mut line = serde_json::to_vec(alert)?;
        line.push(b'\n');
        self.file.write_all(&line)?;
        self.file.flush()?;
        debug!(alert_id = %alert.alert_id, "alert journaled");
        Ok(())
    }
}

/// Read every parseable alert from a journal file.
///
/// Unparseable lines (typically a partial trailing line) are skipped with
/// a warning, never an error.
pub fn read_all(path: &Path) -> Result<Vec<Alert>, JournalError> {
    let file = File::open(path)?;
    let mut alerts = Vec::new();

    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str(trimmed) {
            Ok(alert) => alerts.push(alert),
            Err(error) => {
                warn!(%error, "skipping unparseable journal line");
            }
        }
    }

    Ok(alerts)
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
