// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use sentinel_core::data;
use yare::parameterized;

fn listener_event() -> Event {
    Event::new(
        "network",
        "new_listener",
        data! { "local_port" => 4444, "process" => "nc.exe", "trusted" => false },
    )
}

fn one(field: &str, op: Op, value: Scalar) -> Condition {
    Condition {
        field: field.to_string(),
        op,
        value: CondValue::One(value),
    }
}

fn rule_with(conditions: Vec<Condition>) -> Rule {
    Rule::new(
        "NET-SUSP",
        "Suspicious listener",
        "untrusted process opened a port",
        Severity::High,
        "network",
        "new_listener",
        conditions,
        "Listener on port {local_port}",
        "{process} is listening on {local_port}",
    )
}

#[test]
fn matches_requires_source_and_event_type() {
    let rule = rule_with(vec![]);

    assert!(rule.matches(&listener_event()));
    assert!(!rule.matches(&Event::new("process", "new_listener", data! {})));
    assert!(!rule.matches(&Event::new("network", "port_scan_detected", data! {})));
}

#[test]
fn conditions_are_a_conjunction() {
    let rule = rule_with(vec![
        one("trusted", Op::Eq, Scalar::Bool(false)),
        one("local_port", Op::Gte, Scalar::Int(1024)),
    ]);
    assert!(rule.matches(&listener_event()));

    let rule = rule_with(vec![
        one("trusted", Op::Eq, Scalar::Bool(false)),
        one("local_port", Op::Gte, Scalar::Int(60000)),
    ]);
    assert!(!rule.matches(&listener_event()));
}

#[test]
fn missing_field_fails_the_condition() {
    let rule = rule_with(vec![one("owner", Op::Eq, Scalar::from("root"))]);
    assert!(!rule.matches(&listener_event()));
}

#[parameterized(
    eq_hit = { Op::Eq, Scalar::Int(4444), true },
    eq_cross_tag = { Op::Eq, Scalar::Float(4444.0), true },
    eq_miss = { Op::Neq, Scalar::Int(4444), false },
    neq_hit = { Op::Neq, Scalar::Int(80), true },
    gt_hit = { Op::Gt, Scalar::Int(1024), true },
    gt_miss = { Op::Gt, Scalar::Int(4444), false },
    gte_boundary = { Op::Gte, Scalar::Int(4444), true },
    lt_miss = { Op::Lt, Scalar::Int(1024), false },
    lte_boundary = { Op::Lte, Scalar::Int(4444), true },
)]
fn numeric_operators_on_local_port(op: Op, value: Scalar, expected: bool) {
    let rule = rule_with(vec![one("local_port", op, value)]);
    assert_eq!(rule.matches(&listener_event()), expected);
}

#[test]
fn ordered_operators_fail_on_non_numeric_operands() {
    // string event value
    let rule = rule_with(vec![one("process", Op::Gt, Scalar::Int(10))]);
    assert!(!rule.matches(&listener_event()));

    // string rule value
    let rule = rule_with(vec![one("local_port", Op::Lt, Scalar::from("9999"))]);
    assert!(!rule.matches(&listener_event()));
}

#[test]
fn in_checks_collection_membership() {
    let cond = Condition {
        field: "local_port".to_string(),
        op: Op::In,
        value: CondValue::Many(vec![Scalar::Int(4444), Scalar::Int(1337)]),
    };
    assert!(rule_with(vec![cond]).matches(&listener_event()));

    let cond = Condition {
        field: "local_port".to_string(),
        op: Op::In,
        value: CondValue::Many(vec![Scalar::Int(22), Scalar::Int(80)]),
    };
    assert!(!rule_with(vec![cond]).matches(&listener_event()));
}

#[test]
fn in_against_a_scalar_never_matches() {
    let rule = rule_with(vec![one("local_port", Op::In, Scalar::Int(4444))]);
    assert!(!rule.matches(&listener_event()));
}

#[test]
fn contains_is_substring_on_string_forms() {
    let rule = rule_with(vec![one("process", Op::Contains, Scalar::from("nc"))]);
    assert!(rule.matches(&listener_event()));

    // numeric event value compared through its string form
    let rule = rule_with(vec![one("local_port", Op::Contains, Scalar::from("44"))]);
    assert!(rule.matches(&listener_event()));

    let rule = rule_with(vec![one("process", Op::Contains, Scalar::from("mimikatz"))]);
    assert!(!rule.matches(&listener_event()));
}

#[test]
fn unknown_operator_fails_without_erroring() {
    let rule = rule_with(vec![
        one("local_port", Op::parse("matches"), Scalar::Int(4444)),
    ]);
    assert!(!rule.matches(&listener_event()));
    // second evaluation exercises the warn-once path
    assert!(!rule.matches(&listener_event()));
}

#[test]
fn create_alert_substitutes_fields() {
    let rule = rule_with(vec![]);
    let alert = rule.create_alert(&listener_event());

    assert_eq!(alert.rule_id, "NET-SUSP");
    assert_eq!(alert.severity, Severity::High);
    assert_eq!(alert.title, "Listener on port 4444");
    assert_eq!(alert.description, "nc.exe is listening on 4444");
}

#[test]
fn create_alert_falls_back_on_missing_key() {
    let rule = Rule::new(
        "NET-SUSP",
        "Suspicious listener",
        "",
        Severity::High,
        "network",
        "new_listener",
        vec![],
        "Listener {local_port} by {owner}",
        "d",
    );
    let alert = rule.create_alert(&listener_event());

    assert_eq!(alert.title, "[NET-SUSP] Suspicious listener");
    assert!(alert.description.contains("owner"));
}

#[test]
fn render_handles_unclosed_brace() {
    let data = data! { "a" => 1 };
    assert_eq!(render("x {a} {oops", &data).unwrap(), "x 1 {oops");
}
