// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time source abstraction.
//!
//! All window and expiry arithmetic (dedup, throttle, TTL cache, port-scan
//! sliding window) goes through [`Clock`] so tests can drive time with
//! [`FakeClock`] instead of sleeping.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Monotonic + wall-clock time source
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic instant for interval arithmetic
    fn now(&self) -> Instant;
    /// Wall-clock milliseconds since the Unix epoch
    fn epoch_ms(&self) -> u64;
}

/// Real time for production use
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Manually advanced clock for tests. Clones share the same underlying time.
#[derive(Clone)]
pub struct FakeClock {
    start: Instant,
    base_epoch_ms: u64,
    offset: Arc<Mutex<Duration>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            base_epoch_ms: 1_700_000_000_000,
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Move time forward for every clone of this clock.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock()
    }

    fn epoch_ms(&self) -> u64 {
        self.base_epoch_ms + self.offset.lock().as_millis() as u64
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
