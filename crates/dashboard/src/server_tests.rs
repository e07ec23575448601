// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sentinel_core::{data, Severity};

fn event(n: i64) -> Event {
    Event::new("process", "tick", data! { "n" => n })
}

fn alert(n: i64) -> Alert {
    Alert::new("R1", Severity::Low, "t", "d", event(n))
}

#[test]
fn event_ring_drops_oldest_on_overflow() {
    let mut rings = Rings::default();
    for n in 0..(MAX_RECENT_EVENTS as i64 + 10) {
        rings.push_event(event(n));
    }

    assert_eq!(rings.events.len(), MAX_RECENT_EVENTS);
    assert_eq!(
        rings.events.front().unwrap().data["n"],
        sentinel_core::Scalar::Int(10)
    );
    assert_eq!(
        rings.events.back().unwrap().data["n"],
        sentinel_core::Scalar::Int(MAX_RECENT_EVENTS as i64 + 9)
    );
}

#[test]
fn alert_ring_is_bounded_at_fifty() {
    let mut rings = Rings::default();
    for n in 0..80 {
        rings.push_alert(alert(n));
    }
    assert_eq!(rings.alerts.len(), MAX_RECENT_ALERTS);
}

#[test]
fn index_page_is_embedded() {
    assert!(INDEX_HTML.contains("SENTINEL"));
    assert!(INDEX_HTML.contains("/ws"));
}
