// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rate-limited HTTP client for the Ollama API.

use sentinel_core::OllamaConfig;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Probe timeout for the availability check
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// What we currently know about the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Not probed yet
    Unknown,
    Available,
    Unavailable,
}

/// HTTP caller for `/api/tags` (probe) and `/api/generate`.
///
/// Consecutive `generate` calls are spaced by at least the configured rate
/// limit. Connection and timeout failures flip the availability flag so
/// callers stop asking until the next probe.
pub struct OllamaClient {
    config: OllamaConfig,
    http: reqwest::Client,
    last_call: Option<Instant>,
    availability: Availability,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            last_call: None,
            availability: Availability::Unknown,
        }
    }

    pub fn availability(&self) -> Availability {
        self.availability
    }

    /// Check whether the backend answers at all.
    pub async fn probe(&mut self) -> bool {
        let url = format!("{}/api/tags", self.config.url);
        match self.http.get(url).timeout(PROBE_TIMEOUT).send().await {
            Ok(resp) => {
                let ok = resp.status().is_success();
                self.availability = if ok {
                    Availability::Available
                } else {
                    Availability::Unavailable
                };
                ok
            }
            Err(err) => {
                debug!(error = %err, "ollama probe failed");
                self.availability = Availability::Unavailable;
                false
            }
        }
    }

    /// Generate a completion. `None` means no answer: backend down, over
    /// timeout, error status, or empty response.
    pub async fn generate(&mut self, prompt: &str) -> Option<String> {
        let wait = rate_limit_wait(self.last_call, Instant::now(), self.config.rate_limit());
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
        self.last_call = Some(Instant::now());

        let body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": 0.3,
                "num_predict": 300,
            },
        });

        let url = format!("{}/api/generate", self.config.url);
        let result = self
            .http
            .post(url)
            .timeout(self.config.timeout())
            .json(&body)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                self.availability = Availability::Available;
                let value: serde_json::Value = resp.json().await.ok()?;
                let text = value.get("response")?.as_str()?.trim().to_string();
                if text.is_empty() {
                    None
                } else {
                    Some(text)
                }
            }
            Ok(resp) => {
                warn!(status = %resp.status(), "ollama returned an error status");
                None
            }
            Err(err) if err.is_connect() || err.is_timeout() => {
                debug!(error = %err, "ollama unreachable");
                self.availability = Availability::Unavailable;
                None
            }
            Err(err) => {
                warn!(error = %err, "ollama request failed");
                None
            }
        }
    }
}

/// How long a caller must wait before the next request.
pub(crate) fn rate_limit_wait(
    last: Option<Instant>,
    now: Instant,
    rate_limit: Duration,
) -> Duration {
    match last {
        None => Duration::ZERO,
        Some(last) => rate_limit.saturating_sub(now.duration_since(last)),
    }
}

#[cfg(test)]
#[path = "ollama_tests.rs"]
mod tests;
