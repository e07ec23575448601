// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decides when an alert deserves an LLM explanation and produces it.

use crate::cache::TtlCache;
use crate::ollama::{Availability, OllamaClient};
use async_trait::async_trait;
use sentinel_core::{Alert, OllamaConfig, Severity};
use std::time::Duration;
use tracing::debug;

/// Answers stay valid this long per fingerprint
const CACHE_TTL: Duration = Duration::from_secs(600);
const CACHE_CAPACITY: usize = 200;

/// Enrichment seam for the alert pipeline
#[async_trait]
pub trait Enrich: Send + Sync + 'static {
    /// Explanation for the alert, or `None` when enrichment is skipped or
    /// failed. Never blocks an alert either way.
    async fn enrich(&self, alert: &Alert) -> Option<String>;
}

struct EnricherState {
    client: OllamaClient,
    cache: TtlCache<sentinel_core::SystemClock>,
}

/// Severity-gated, cached Ollama enricher
pub struct Enricher {
    min_severity: Severity,
    state: tokio::sync::Mutex<EnricherState>,
}

impl Enricher {
    pub fn new(config: OllamaConfig) -> Self {
        let min_severity = config.min_severity;
        Self {
            min_severity,
            state: tokio::sync::Mutex::new(EnricherState {
                client: OllamaClient::new(config),
                cache: TtlCache::new(CACHE_TTL, CACHE_CAPACITY, sentinel_core::SystemClock),
            }),
        }
    }

    /// The fixed analyst prompt sent to the model.
    pub fn build_prompt(alert: &Alert) -> String {
        let event_data = alert
            .event
            .data
            .iter()
            .map(|(key, value)| format!("  - {key}: {value}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Eres un analista de seguridad explicando alertas de un IDS personal en Windows 11.\n\
             \n\
             Alerta detectada:\n\
             - Regla: {rule_id}\n\
             - Severidad: {severity}\n\
             - Título: {title}\n\
             - Descripción: {description}\n\
             - Datos del evento:\n\
             {event_data}\n\
             \n\
             Explica en español en 2-3 oraciones:\n\
             1. Qué significa esta alerta para un usuario normal\n\
             2. Si es probablemente benigno o preocupante\n\
             3. Qué acción recomiendas (si alguna)\n\
             \n\
             Sé conciso y directo.",
            rule_id = alert.rule_id,
            severity = alert.severity,
            title = alert.title,
            description = alert.description,
        )
    }
}

#[async_trait]
impl Enrich for Enricher {
    async fn enrich(&self, alert: &Alert) -> Option<String> {
        if alert.severity < self.min_severity {
            return None;
        }

        let mut state = self.state.lock().await;

        if state.client.availability() == Availability::Unavailable {
            return None;
        }

        let key = alert.fingerprint();
        if let Some(cached) = state.cache.get(&key) {
            return Some(cached.to_string());
        }

        let prompt = Self::build_prompt(alert);
        let response = state.client.generate(&prompt).await?;

        debug!(rule = %alert.rule_id, chars = response.len(), "llm explanation obtained");
        state.cache.set(key, response.clone());
        Some(response)
    }
}

/// Scripted enricher for tests: records fingerprints, returns a canned
/// answer.
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone, Default)]
pub struct FakeEnrich {
    response: std::sync::Arc<parking_lot::Mutex<Option<String>>>,
    calls: std::sync::Arc<parking_lot::Mutex<Vec<String>>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeEnrich {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(&self, response: &str) {
        *self.response.lock() = Some(response.to_string());
    }

    /// Fingerprints of every alert offered for enrichment
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl Enrich for FakeEnrich {
    async fn enrich(&self, alert: &Alert) -> Option<String> {
        self.calls.lock().push(alert.fingerprint());
        self.response.lock().clone()
    }
}

#[cfg(test)]
#[path = "enricher_tests.rs"]
mod tests;
