// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem watcher bridging `notify` to the polling loop.
//!
//! `notify` delivers events on its own OS thread. The callback pushes onto
//! a bounded channel and the filesystem monitor drains it on each tick, so
//! the async scheduler never blocks on watcher activity.

use crate::probe::ProbeError;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{sync_channel, Receiver};
use tracing::{debug, warn};

/// Queue capacity between the notify thread and the polling task.
/// Overflow drops changes; the next modification re-surfaces the file.
const QUEUE_CAPACITY: usize = 1024;

/// Kind of filesystem change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsChangeKind {
    Created,
    Modified,
}

/// One filesystem change pulled from the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsChange {
    pub kind: FsChangeKind,
    pub path: PathBuf,
}

/// Live watches over the configured paths
pub struct FsWatcher {
    // NOTE(lifetime): dropping the watcher removes the OS watches
    _watcher: RecommendedWatcher,
    rx: Receiver<FsChange>,
    watched: usize,
}

impl FsWatcher {
    /// Watch the given paths: a file path watches its parent directory,
    /// a directory watches itself, missing paths are skipped.
    pub fn watch(paths: &[PathBuf]) -> Result<Self, ProbeError> {
        let (tx, rx) = sync_channel::<FsChange>(QUEUE_CAPACITY);

        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                let event = match res {
                    Ok(event) => event,
                    Err(_) => return,
                };
                let kind = match event.kind {
                    notify::EventKind::Create(_) => FsChangeKind::Created,
                    notify::EventKind::Modify(_) => FsChangeKind::Modified,
                    _ => return,
                };
                for path in event.paths {
                    let _ = tx.try_send(FsChange { kind, path });
                }
            })?;

        let mut watched = 0;
        for path in paths {
            let target: &Path = if path.is_file() {
                match path.parent() {
                    Some(parent) => parent,
                    None => continue,
                }
            } else if path.is_dir() {
                path
            } else {
                debug!(path = %path.display(), "watched path does not exist, skipping");
                continue;
            };

            match watcher.watch(target, RecursiveMode::NonRecursive) {
                Ok(()) => {
                    watched += 1;
                    debug!(path = %target.display(), "watching");
                }
                Err(error) => {
                    warn!(path = %target.display(), %error, "cannot watch path");
                }
            }
        }

        Ok(Self {
            _watcher: watcher,
            rx,
            watched,
        })
    }

    /// Number of paths successfully registered.
    pub fn watched(&self) -> usize {
        self.watched
    }

    /// Drain pending changes without blocking.
    pub fn drain(&self) -> Vec<FsChange> {
        let mut changes = Vec::new();
        while let Ok(change) = self.rx.try_recv() {
            changes.push(change);
        }
        changes
    }
}

#[cfg(test)]
#[path = "fswatch_tests.rs"]
mod tests;
