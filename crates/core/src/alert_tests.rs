// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::data;

fn listener_event() -> Event {
    Event::new(
        "network",
        "new_listener",
        data! { "local_port" => 4444, "process" => "nc.exe", "trusted" => false },
    )
}

#[test]
fn fingerprint_joins_rule_and_sorted_data() {
    let alert = Alert::new(
        "NET-SUSP",
        Severity::High,
        "Suspicious listener",
        "nc.exe on 4444",
        listener_event(),
    );
    assert_eq!(
        alert.fingerprint(),
        "NET-SUSP|local_port=4444|process=nc.exe|trusted=false"
    );
}

#[test]
fn fingerprint_ignores_ids_and_timestamps() {
    let a = Alert::new("R1", Severity::Low, "t", "d", listener_event());
    let b = Alert::new("R1", Severity::Low, "t", "d", listener_event());
    assert_ne!(a.alert_id, b.alert_id);
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn serde_round_trip_preserves_logical_fields() {
    let mut alert = Alert::new(
        "NET-SUSP",
        Severity::Critical,
        "Suspicious listener",
        "nc.exe on 4444",
        listener_event(),
    );
    alert.llm_explanation = Some("reverse shell tooling".to_string());

    let line = serde_json::to_string(&alert).unwrap();
    let parsed: Alert = serde_json::from_str(&line).unwrap();
    assert_eq!(parsed, alert);
}

#[test]
fn journal_line_shape() {
    let alert = Alert::new("FS-HOSTS", Severity::Medium, "t", "d", listener_event());
    let value: serde_json::Value =
        serde_json::from_str(&serde_json::to_string(&alert).unwrap()).unwrap();

    assert_eq!(value["severity"], "MEDIUM");
    assert_eq!(value["llm_explanation"], serde_json::Value::Null);
    assert_eq!(value["event"]["source"], "network");
    assert_eq!(value["event"]["data"]["local_port"], 4444);
    // RFC 3339 timestamps
    assert!(value["timestamp"].as_str().unwrap().contains('T'));
}
