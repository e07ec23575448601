// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol for the dashboard WebSocket.
//!
//! Every server message is `{"type": ..., "data": ...}`; `pong` carries no
//! data. The only client message is `{"type": "ping"}`.

use sentinel_core::{Alert, Event};
use sentinel_engine::{Snapshot, Stats};
use serde::{Deserialize, Serialize};

/// Server → client messages
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full state on connect
    Snapshot(SnapshotData),
    /// One new event
    Event(Event),
    /// One emitted alert
    Alert(Alert),
    /// Full listener table, sent when a network event arrives
    ListenersUpdate(serde_json::Value),
    /// Periodic counters
    Stats(StatsData),
    Pong,
}

/// Snapshot payload: engine state plus the recent-history ring buffers
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotData {
    #[serde(flatten)]
    pub snapshot: Snapshot,
    pub recent_alerts: Vec<Alert>,
    pub recent_events: Vec<Event>,
}

/// Stats payload
#[derive(Debug, Clone, Serialize)]
pub struct StatsData {
    #[serde(flatten)]
    pub stats: Stats,
    pub ws_clients: usize,
}

/// Client → server messages
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
