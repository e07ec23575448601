// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sentinel-intel: LLM-backed alert enrichment.
//!
//! The Ollama client is a bounded oracle: rate-limited, timeout-bounded,
//! and flagged unavailable on connection failures so the pipeline stops
//! asking. Answers are cached by alert fingerprint.

pub mod cache;
pub mod enricher;
pub mod ollama;

pub use cache::TtlCache;
pub use enricher::{Enrich, Enricher};
pub use ollama::{Availability, OllamaClient};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use enricher::FakeEnrich;
