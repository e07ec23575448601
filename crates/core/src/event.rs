// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Security events observed by monitors

use crate::id::short_id;
use crate::scalar::Scalar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rule-addressable event payload. Sorted keys make fingerprints deterministic.
pub type EventData = BTreeMap<String, Scalar>;

/// An observation emitted by a monitor.
///
/// Events are immutable once constructed: they are evaluated against the
/// rule catalog, optionally journaled inside an [`crate::Alert`], and dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Monitor tag, e.g. `"network"` or `"process"`
    pub source: String,
    /// Semantic tag within the source, e.g. `"new_listener"`
    pub event_type: String,
    pub data: EventData,
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(
        source: impl Into<String>,
        event_type: impl Into<String>,
        data: EventData,
    ) -> Self {
        Self {
            source: source.into(),
            event_type: event_type.into(),
            data,
            event_id: short_id(),
            timestamp: Utc::now(),
        }
    }

    /// Field lookup for rule evaluation.
    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.data.get(key)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
