// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sentinel-dashboard: live web dashboard.
//!
//! Serves a static index page and a WebSocket channel. New clients get a
//! full snapshot; afterwards they receive typed deltas. Every client has
//! its own bounded outgoing queue, and a client that cannot keep up is
//! dropped instead of backpressuring the engine.

pub mod protocol;
pub mod server;

pub use protocol::{ClientMessage, ServerMessage, SnapshotData, StatsData};
pub use server::{serve, DashboardError};
