// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sentinel-adapters: OS probes and side-effect adapters.
//!
//! Everything that touches the outside world lives here behind a trait:
//! socket/process/event-log probes, the filesystem watcher bridge, and
//! desktop notifications. Monitors stay pure diffing logic and tests swap
//! in the fakes.

pub mod fswatch;
pub mod netstat;
pub mod notify_adapter;
pub mod probe;
pub mod subprocess;
pub mod tasklist;
pub mod wevtutil;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeEventLogProbe, FakeProcessProbe, FakeSocketProbe};

pub use fswatch::{FsChange, FsChangeKind, FsWatcher};
pub use netstat::NetstatProbe;
pub use notify_adapter::{DesktopNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError};
#[cfg(any(test, feature = "test-support"))]
pub use notify_adapter::{FakeNotifyAdapter, NotifyCall};
pub use probe::{
    EstablishedConn, EventLogProbe, ListenerRecord, LogRecord, ProbeError, ProcessProbe,
    ProcessRecord, Proto, SocketProbe,
};
pub use subprocess::run_with_timeout;
pub use tasklist::TasklistProbe;
pub use wevtutil::WevtutilProbe;
