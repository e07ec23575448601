// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rule-matching specs against a YAML catalog.

use crate::prelude::*;
use sentinel_core::{data, Event, Severity};

fn listener_event(trusted: Option<bool>, port: i64) -> Event {
    let mut data = data! { "local_port" => port, "process" => "unknown" };
    if let Some(trusted) = trusted {
        data.insert("trusted".to_string(), trusted.into());
    }
    Event::new("network", "new_listener", data)
}

#[test]
fn matching_event_produces_one_alert() {
    let catalog = load_catalog(NET_SUSP_RULES);
    let alerts = catalog.evaluate(&listener_event(Some(false), 4444));

    assert_eq!(alerts.len(), 1);
    let alert = &alerts[0];
    assert_eq!(alert.rule_id, "NET-SUSP");
    assert_eq!(alert.severity, Severity::High);
    assert_eq!(alert.title, "Listener on port 4444");
    assert_eq!(alert.description, "unknown is listening on 4444");
}

#[test]
fn missing_condition_field_means_no_match() {
    let catalog = load_catalog(NET_SUSP_RULES);
    assert!(catalog.evaluate(&listener_event(None, 4444)).is_empty());
}

#[test]
fn all_conditions_must_hold() {
    let catalog = load_catalog(NET_SUSP_RULES);

    // trusted listener: first condition fails
    assert!(catalog.evaluate(&listener_event(Some(true), 4444)).is_empty());
    // privileged port: second condition fails
    assert!(catalog.evaluate(&listener_event(Some(false), 445)).is_empty());
}

#[test]
fn source_and_event_type_gate_evaluation() {
    let catalog = load_catalog(NET_SUSP_RULES);

    let wrong_source = Event::new(
        "process",
        "new_listener",
        data! { "trusted" => false, "local_port" => 4444 },
    );
    let wrong_type = Event::new(
        "network",
        "port_scan_detected",
        data! { "trusted" => false, "local_port" => 4444 },
    );

    assert!(catalog.evaluate(&wrong_source).is_empty());
    assert!(catalog.evaluate(&wrong_type).is_empty());
}
