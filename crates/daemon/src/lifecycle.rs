// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: config → privileges → catalog → monitors → engine.
//!
//! Everything here can abort with exit code 1; once `startup` returns,
//! nothing in the steady-state loop is fatal.

use crate::banner::BannerInfo;
use sentinel_adapters::{
    run_with_timeout, DesktopNotifyAdapter, NetstatProbe, TasklistProbe, WevtutilProbe,
};
use sentinel_core::{Config, ConfigError, DashboardConfig, SystemClock};
use sentinel_engine::{AlertPipeline, Engine, EngineHandle, Feed};
use sentinel_intel::Enricher;
use sentinel_monitors::{
    EventLogMonitor, FilesystemMonitor, Monitor, NetworkMonitor, PortScanMonitor,
    ProcessMonitor, StatusBoard,
};
use sentinel_rules::{Catalog, CatalogError};
use sentinel_storage::{AlertJournal, JournalError};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::info;

/// Engine with the daemon's concrete adapter types
pub type DaemonEngine = Engine<Enricher, DesktopNotifyAdapter, SystemClock>;

/// Capacity of the engine → dashboard feed
const FEED_CAPACITY: usize = 512;

/// Errors that abort startup
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Journal(#[from] JournalError),
}

/// Everything `main` needs to run the daemon
pub struct Startup {
    pub engine: DaemonEngine,
    pub handle: EngineHandle,
    /// Present when the dashboard is enabled
    pub feed_rx: Option<mpsc::Receiver<Feed>>,
    pub dashboard: DashboardConfig,
    pub info: BannerInfo,
}

/// Whether the daemon runs with elevated privileges.
///
/// Never fails: an unanswerable check means "not elevated" and the event
/// log monitor degrades.
pub async fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        let mut cmd = tokio::process::Command::new("id");
        cmd.arg("-u");
        match run_with_timeout(cmd, Duration::from_secs(5), "id -u").await {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "0",
            Err(_) => false,
        }
    }
    #[cfg(windows)]
    {
        // `net session` only succeeds in an elevated shell
        let mut cmd = tokio::process::Command::new("net");
        cmd.arg("session");
        match run_with_timeout(cmd, Duration::from_secs(5), "net session").await {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }
    #[cfg(not(any(unix, windows)))]
    {
        false
    }
}

/// Assemble the daemon from its configuration file.
pub async fn startup(config_path: &Path) -> Result<Startup, LifecycleError> {
    let config = Config::load(config_path)?;
    info!(path = %config_path.display(), "configuration loaded");

    let elevated = is_elevated().await;
    let catalog = Catalog::load(&config.rules_path)?;
    let rules_loaded = catalog.len();

    let board = StatusBoard::new();
    let mut monitors: Vec<Box<dyn Monitor>> = Vec::new();
    let mut statuses: Vec<(&'static str, &'static str)> = Vec::new();

    if config.monitors.network.enabled {
        let mut ignored_ports = HashSet::new();
        if config.dashboard.enabled {
            // the dashboard's own listener is not news
            ignored_ports.insert(config.dashboard.port);
        }
        monitors.push(Box::new(NetworkMonitor::new(
            config.monitors.network.interval(),
            NetstatProbe::new(),
            TasklistProbe::new(),
            &config.trusted_processes,
            ignored_ports,
        )));
        statuses.push(("network", "ON"));
    } else {
        statuses.push(("network", "OFF"));
    }

    if config.monitors.portscan.enabled {
        monitors.push(Box::new(PortScanMonitor::new(
            config.monitors.portscan.interval(),
            NetstatProbe::new(),
            SystemClock,
        )));
        statuses.push(("portscan", "ON"));
    } else {
        statuses.push(("portscan", "OFF"));
    }

    if config.monitors.eventlog.enabled {
        monitors.push(Box::new(EventLogMonitor::new(
            config.monitors.eventlog.interval(),
            WevtutilProbe::new(),
            elevated,
        )));
        statuses.push(("eventlog", if elevated { "ON" } else { "DEGRADED" }));
    } else {
        statuses.push(("eventlog", "OFF"));
    }

    if config.monitors.process.enabled {
        monitors.push(Box::new(ProcessMonitor::new(
            config.monitors.process.interval(),
            TasklistProbe::new(),
            &config.trusted_processes,
        )));
        statuses.push(("process", "ON"));
    } else {
        statuses.push(("process", "OFF"));
    }

    if config.monitors.filesystem.enabled {
        monitors.push(Box::new(FilesystemMonitor::new(
            config.monitors.filesystem.interval(),
            config.watched_paths.clone(),
        )));
        statuses.push(("filesystem", "ON"));
    } else {
        statuses.push(("filesystem", "OFF"));
    }

    let journal = AlertJournal::open(&config.alerts.log_file)?;
    let pipeline = AlertPipeline::new(
        config.alerts.clone(),
        Enricher::new(config.ollama.clone()),
        journal,
        DesktopNotifyAdapter::new(),
        SystemClock,
    );

    let (feed_tx, feed_rx) = if config.dashboard.enabled {
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        (Some(tx), Some(rx))
    } else {
        (None, None)
    };

    let engine = Engine::new(catalog, pipeline, monitors, board, feed_tx);
    let handle = engine.handle();

    let info = BannerInfo {
        elevated,
        rules_loaded,
        log_file: config.alerts.log_file.clone(),
        monitors: statuses,
        toast_enabled: config.alerts.toast_enabled,
        ollama_model: config.ollama.model.clone(),
        ollama_url: config.ollama.url.clone(),
        dashboard_url: config.dashboard.enabled.then(|| config.dashboard.url()),
    };

    Ok(Startup {
        engine,
        handle,
        feed_rx,
        dashboard: config.dashboard.clone(),
        info,
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
