// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sentinel_core::OllamaConfig;

#[test]
fn availability_starts_unknown() {
    let client = OllamaClient::new(OllamaConfig::default());
    assert_eq!(client.availability(), Availability::Unknown);
}

#[test]
fn first_call_never_waits() {
    let now = Instant::now();
    assert_eq!(
        rate_limit_wait(None, now, Duration::from_secs(2)),
        Duration::ZERO
    );
}

#[test]
fn calls_inside_the_rate_window_wait_the_remainder() {
    let start = Instant::now();
    let now = start + Duration::from_millis(500);
    assert_eq!(
        rate_limit_wait(Some(start), now, Duration::from_secs(2)),
        Duration::from_millis(1500)
    );
}

#[test]
fn calls_past_the_rate_window_do_not_wait() {
    let start = Instant::now();
    let now = start + Duration::from_secs(3);
    assert_eq!(
        rate_limit_wait(Some(start), now, Duration::from_secs(2)),
        Duration::ZERO
    );
}
