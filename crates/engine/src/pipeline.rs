// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alert pipeline: dedup → throttle → enrich → journal → toast.
//!
//! The order is part of the contract: suppressed alerts never reach the
//! enricher, the journaled record carries the explanation, and the toast
//! fires only after the write.

use sentinel_adapters::NotifyAdapter;
use sentinel_core::{Alert, AlertsConfig, Clock};
use sentinel_intel::Enrich;
use sentinel_storage::AlertJournal;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Longest description carried into a toast
const TOAST_DESCRIPTION_LIMIT: usize = 200;

pub struct AlertPipeline<E, N, C> {
    config: AlertsConfig,
    enricher: E,
    journal: AlertJournal,
    notifier: N,
    clock: C,
    /// fingerprint → last seen
    seen: HashMap<String, Instant>,
    /// rule id → last emission
    last_emit: HashMap<String, Instant>,
}

impl<E: Enrich, N: NotifyAdapter, C: Clock> AlertPipeline<E, N, C> {
    pub fn new(
        config: AlertsConfig,
        enricher: E,
        journal: AlertJournal,
        notifier: N,
        clock: C,
    ) -> Self {
        Self {
            config,
            enricher,
            journal,
            notifier,
            clock,
            seen: HashMap::new(),
            last_emit: HashMap::new(),
        }
    }

    /// Run one alert through the pipeline.
    ///
    /// Returns true iff the alert survived dedup and throttle and reached
    /// the journal step. Journal and toast failures are logged but never
    /// turn an emitted alert back into a dropped one.
    pub async fn process(&mut self, alert: &mut Alert) -> bool {
        if self.is_duplicate(alert) {
            debug!(rule = %alert.rule_id, "duplicate alert dropped");
            return false;
        }
        if self.is_throttled(alert) {
            debug!(rule = %alert.rule_id, "alert throttled");
            return false;
        }

        if let Some(explanation) = self.enricher.enrich(alert).await {
            alert.llm_explanation = Some(explanation);
        }

        if let Err(error) = self.journal.append(alert) {
            warn!(%error, "journal write failed");
        }

        if self.config.toast_enabled {
            let title = format!("[{}] {}", alert.severity, alert.title);
            let message = truncate(&alert.description, TOAST_DESCRIPTION_LIMIT);
            if let Err(error) = self.notifier.notify(&title, &message).await {
                warn!(%error, "toast failed");
            }
        }

        info!(
            severity = %alert.severity,
            rule = %alert.rule_id,
            title = %alert.title,
            "alert emitted"
        );
        true
    }

    /// Fingerprint-based suppression within the dedup window.
    ///
    /// The fingerprint is recorded even when the alert is later throttled.
    fn is_duplicate(&mut self, alert: &Alert) -> bool {
        let now = self.clock.now();
        let window = self.config.dedup_window();
        self.seen
            .retain(|_, last_seen| now.duration_since(*last_seen) <= window);

        let fingerprint = alert.fingerprint();
        if self.seen.contains_key(&fingerprint) {
            return true;
        }
        self.seen.insert(fingerprint, now);
        false
    }

    fn is_throttled(&mut self, alert: &Alert) -> bool {
        let now = self.clock.now();
        if let Some(&last) = self.last_emit.get(&alert.rule_id) {
            if now.duration_since(last) < self.config.throttle_per_rule() {
                return true;
            }
        }
        self.last_emit.insert(alert.rule_id.clone(), now);
        false
    }
}

fn truncate(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
