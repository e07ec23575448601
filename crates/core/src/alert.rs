// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alerts fired by the rule catalog

use crate::event::Event;
use crate::id::short_id;
use crate::severity::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A rule-fired notification.
///
/// `llm_explanation` is set at most once, during enrichment; an alert is
/// never mutated after it reaches the journal. One alert serializes to one
/// self-contained journal line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: String,
    pub rule_id: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub llm_explanation: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub event: Event,
}

impl Alert {
    pub fn new(
        rule_id: impl Into<String>,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
        event: Event,
    ) -> Self {
        Self {
            alert_id: short_id(),
            rule_id: rule_id.into(),
            severity,
            title: title.into(),
            description: description.into(),
            llm_explanation: None,
            timestamp: Utc::now(),
            event,
        }
    }

    /// Deduplication fingerprint: the rule id joined with every `key=value`
    /// pair of the triggering event's data, in key order.
    ///
    /// Two alerts with the same fingerprint describe the same observation.
    pub fn fingerprint(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.event.data.len());
        parts.push(self.rule_id.clone());
        for (key, value) in &self.event.data {
            parts.push(format!("{key}={value}"));
        }
        parts.join("|")
    }
}

#[cfg(test)]
#[path = "alert_tests.rs"]
mod tests;
