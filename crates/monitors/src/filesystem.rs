// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem monitor.
//!
//! Change notifications accumulate on the watcher's queue between ticks;
//! each poll drains the queue and emits `file_created` / `file_modified`
//! for paths in scope: the exact watched files and anything inside a
//! watched directory. Watching a file really watches its parent, so
//! sibling noise is filtered out here.

use crate::monitor::{Monitor, MonitorError};
use async_trait::async_trait;
use sentinel_adapters::{FsChange, FsChangeKind, FsWatcher};
use sentinel_core::{data, Event};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub struct FilesystemMonitor {
    interval: Duration,
    watched_paths: Vec<PathBuf>,
    watched_files: Vec<PathBuf>,
    watched_dirs: Vec<PathBuf>,
    watcher: Option<FsWatcher>,
}

impl FilesystemMonitor {
    pub fn new(interval: Duration, watched_paths: Vec<PathBuf>) -> Self {
        Self {
            interval,
            watched_paths,
            watched_files: Vec::new(),
            watched_dirs: Vec::new(),
            watcher: None,
        }
    }
}

/// Split configured paths into files and directories, by what exists now.
fn classify(paths: &[PathBuf]) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            dirs.push(path.clone());
        }
    }
    (files, dirs)
}

fn in_scope(path: &Path, files: &[PathBuf], dirs: &[PathBuf]) -> bool {
    files.iter().any(|f| path == f) || dirs.iter().any(|d| path.starts_with(d))
}

/// Turn drained changes into events, dropping directories and out-of-scope
/// paths.
fn build_events(changes: Vec<FsChange>, files: &[PathBuf], dirs: &[PathBuf]) -> Vec<Event> {
    let mut events = Vec::new();

    for change in changes {
        if change.path.is_dir() {
            continue;
        }
        if !in_scope(&change.path, files, dirs) {
            continue;
        }

        let event_type = match change.kind {
            FsChangeKind::Created => "file_created",
            FsChangeKind::Modified => "file_modified",
        };
        let file_name = change
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let directory = change
            .path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        events.push(Event::new(
            "filesystem",
            event_type,
            data! {
                "file_path" => change.path.display().to_string(),
                "file_name" => file_name,
                "directory" => directory,
            },
        ));
    }

    events
}

#[async_trait]
impl Monitor for FilesystemMonitor {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn setup(&mut self) -> Result<(), MonitorError> {
        let (files, dirs) = classify(&self.watched_paths);
        self.watched_files = files;
        self.watched_dirs = dirs;

        let watcher = FsWatcher::watch(&self.watched_paths)?;
        if watcher.watched() == 0 {
            warn!("no watchable paths configured");
            return Err(MonitorError::NothingToWatch);
        }

        info!(paths = watcher.watched(), "filesystem watches registered");
        self.watcher = Some(watcher);
        Ok(())
    }

    async fn poll(&mut self) -> Result<Vec<Event>, MonitorError> {
        let changes = match &self.watcher {
            Some(watcher) => watcher.drain(),
            None => return Ok(Vec::new()),
        };
        Ok(build_events(
            changes,
            &self.watched_files,
            &self.watched_dirs,
        ))
    }

    fn stop(&mut self) {
        // dropping the watcher tears down the OS watches
        self.watcher = None;
    }
}

#[cfg(test)]
#[path = "filesystem_tests.rs"]
mod tests;
