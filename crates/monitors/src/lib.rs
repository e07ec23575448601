// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sentinel-monitors: polling monitors that turn OS state into events.
//!
//! A monitor owns its snapshot state and emits events only for changes:
//! whatever exists at setup is baseline and stays silent. Monitors never
//! share mutable state; everything downstream sees only the emitted events
//! and the read-only status board.

pub mod eventlog;
pub mod filesystem;
pub mod monitor;
pub mod network;
pub mod portscan;
pub mod process;

pub use eventlog::EventLogMonitor;
pub use filesystem::FilesystemMonitor;
pub use monitor::{
    run_monitor, Health, Monitor, MonitorError, MonitorPanel, MonitorStatus, StatusBoard,
};
pub use network::NetworkMonitor;
pub use portscan::PortScanMonitor;
pub use process::ProcessMonitor;
