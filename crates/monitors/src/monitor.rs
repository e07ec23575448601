// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monitor capability trait, status board and polling runner.

use async_trait::async_trait;
use parking_lot::Mutex;
use sentinel_core::Event;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

/// Errors from monitor setup and polling
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Probe(#[from] sentinel_adapters::ProbeError),
    #[error("no watchable paths configured")]
    NothingToWatch,
}

/// Monitor visibility, distinct from the running/stopped lifecycle.
///
/// `Degraded` means the monitor runs with reduced coverage, e.g. the event
/// log monitor without the privileged Security channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    On,
    Degraded,
}

/// A polling monitor: `setup` once, then `poll` every `interval`.
#[async_trait]
pub trait Monitor: Send + 'static {
    fn name(&self) -> &'static str;

    fn interval(&self) -> Duration;

    fn health(&self) -> Health {
        Health::On
    }

    /// One-time initialization, typically the baseline capture.
    async fn setup(&mut self) -> Result<(), MonitorError> {
        Ok(())
    }

    /// One observation cycle. Returned events are delivered in order.
    async fn poll(&mut self) -> Result<Vec<Event>, MonitorError>;

    /// Current state for the dashboard panel.
    fn state(&self) -> serde_json::Value {
        serde_json::Value::Object(serde_json::Map::new())
    }

    /// Shutdown hook.
    fn stop(&mut self) {}
}

/// Lifecycle status published to the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorStatus {
    Running,
    Degraded,
    Stopped,
}

/// One monitor's dashboard panel
#[derive(Debug, Clone, Serialize)]
pub struct MonitorPanel {
    pub status: MonitorStatus,
    pub interval_secs: u64,
    pub state: serde_json::Value,
}

/// Shared name → panel map.
///
/// Monitor runners write their own entry; the engine snapshot and the
/// dashboard only read. Clones share the underlying map.
#[derive(Clone, Default)]
pub struct StatusBoard {
    inner: Arc<Mutex<BTreeMap<String, MonitorPanel>>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, name: &str, panel: MonitorPanel) {
        self.inner.lock().insert(name.to_string(), panel);
    }

    pub fn set_status(&self, name: &str, status: MonitorStatus) {
        if let Some(panel) = self.inner.lock().get_mut(name) {
            panel.status = status;
        }
    }

    pub fn set_state(&self, name: &str, state: serde_json::Value) {
        if let Some(panel) = self.inner.lock().get_mut(name) {
            panel.state = state;
        }
    }

    /// Current state value of one monitor's panel.
    pub fn panel_state(&self, name: &str) -> Option<serde_json::Value> {
        self.inner.lock().get(name).map(|p| p.state.clone())
    }

    pub fn snapshot(&self) -> BTreeMap<String, MonitorPanel> {
        self.inner.lock().clone()
    }
}

/// Run one monitor's polling loop until shutdown.
///
/// Setup failure stops this monitor only. Poll failures are logged and the
/// tick is skipped; the loop keeps going.
pub async fn run_monitor(
    mut monitor: Box<dyn Monitor>,
    board: StatusBoard,
    events: mpsc::Sender<Event>,
    mut shutdown: watch::Receiver<bool>,
) {
    let name = monitor.name();
    let interval = monitor.interval();

    if let Err(err) = monitor.setup().await {
        error!(monitor = name, error = %err, "monitor setup failed");
        board.publish(
            name,
            MonitorPanel {
                status: MonitorStatus::Stopped,
                interval_secs: interval.as_secs(),
                state: monitor.state(),
            },
        );
        return;
    }

    let status = match monitor.health() {
        Health::On => MonitorStatus::Running,
        Health::Degraded => MonitorStatus::Degraded,
    };
    board.publish(
        name,
        MonitorPanel {
            status,
            interval_secs: interval.as_secs(),
            state: monitor.state(),
        },
    );
    info!(monitor = name, interval_secs = interval.as_secs(), "monitor started");

    'run: loop {
        match monitor.poll().await {
            Ok(batch) => {
                for event in batch {
                    if events.send(event).await.is_err() {
                        // engine loop is gone
                        break 'run;
                    }
                }
                board.set_state(name, monitor.state());
            }
            Err(err) => {
                warn!(monitor = name, error = %err, "poll failed, skipping tick");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.changed() => break,
        }
    }

    monitor.stop();
    board.set_status(name, MonitorStatus::Stopped);
    info!(monitor = name, "monitor stopped");
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
