// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A rule is a (source, event_type) gate plus a conjunction of conditions.
//!
//! Operator semantics are fixed per scalar tag; a combination an operator
//! does not support fails the condition rather than erroring, so a bad rule
//! can never take down a poll cycle.

use sentinel_core::{Alert, Event, EventData, Scalar, Severity};
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Condition operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
    Contains,
    /// Preserved from the rule file so evaluation can warn once and fail
    /// the condition instead of rejecting the whole rule.
    Unknown(String),
}

impl Op {
    pub fn parse(s: &str) -> Op {
        match s {
            "eq" => Op::Eq,
            "neq" => Op::Neq,
            "gt" => Op::Gt,
            "lt" => Op::Lt,
            "gte" => Op::Gte,
            "lte" => Op::Lte,
            "in" => Op::In,
            "contains" => Op::Contains,
            other => Op::Unknown(other.to_string()),
        }
    }
}

/// Rule-side condition value: a scalar, or a collection for `in`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CondValue {
    One(Scalar),
    Many(Vec<Scalar>),
}

/// A single `(field, op, value)` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: Op,
    pub value: CondValue,
}

impl Condition {
    /// Whether the condition holds for the event-side value.
    fn holds(&self, actual: &Scalar) -> bool {
        match &self.op {
            Op::Eq => self.eq_value(actual),
            Op::Neq => !self.eq_value(actual),
            Op::Gt => self.cmp_numeric(actual, |a, b| a > b),
            Op::Lt => self.cmp_numeric(actual, |a, b| a < b),
            Op::Gte => self.cmp_numeric(actual, |a, b| a >= b),
            Op::Lte => self.cmp_numeric(actual, |a, b| a <= b),
            Op::In => match &self.value {
                CondValue::Many(options) => options.iter().any(|v| v.loose_eq(actual)),
                CondValue::One(_) => false,
            },
            Op::Contains => match &self.value {
                CondValue::One(needle) => actual.to_string().contains(&needle.to_string()),
                CondValue::Many(_) => false,
            },
            // Warned by the owning rule; an unknown operator never matches
            Op::Unknown(_) => false,
        }
    }

    fn eq_value(&self, actual: &Scalar) -> bool {
        match &self.value {
            CondValue::One(expected) => expected.loose_eq(actual),
            CondValue::Many(_) => false,
        }
    }

    fn cmp_numeric(&self, actual: &Scalar, cmp: impl Fn(f64, f64) -> bool) -> bool {
        let expected = match &self.value {
            CondValue::One(v) => v.as_f64(),
            CondValue::Many(_) => None,
        };
        match (actual.as_f64(), expected) {
            (Some(a), Some(b)) => cmp(a, b),
            _ => false,
        }
    }
}

/// A declarative detection rule
#[derive(Debug)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub source: String,
    pub event_type: String,
    pub conditions: Vec<Condition>,
    pub alert_title: String,
    pub alert_description: String,
    warned_unknown_op: AtomicBool,
}

impl Rule {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        source: impl Into<String>,
        event_type: impl Into<String>,
        conditions: Vec<Condition>,
        alert_title: impl Into<String>,
        alert_description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            severity,
            source: source.into(),
            event_type: event_type.into(),
            conditions,
            alert_title: alert_title.into(),
            alert_description: alert_description.into(),
            warned_unknown_op: AtomicBool::new(false),
        }
    }

    /// True when source, event_type and every condition hold.
    ///
    /// A field missing from the event data fails its condition; it is not
    /// an error.
    pub fn matches(&self, event: &Event) -> bool {
        if event.source != self.source || event.event_type != self.event_type {
            return false;
        }

        self.conditions.iter().all(|cond| {
            if let Op::Unknown(op) = &cond.op {
                if !self.warned_unknown_op.swap(true, Ordering::Relaxed) {
                    warn!(rule = %self.id, %op, "unknown operator in rule condition");
                }
                return false;
            }
            match event.get(&cond.field) {
                Some(actual) => cond.holds(actual),
                None => false,
            }
        })
    }

    /// Build the alert for a matching event.
    ///
    /// Titles and descriptions substitute `{field}` placeholders from the
    /// event data; a missing key falls back to `[id] name` plus a note
    /// instead of failing.
    pub fn create_alert(&self, event: &Event) -> Alert {
        let rendered = render(&self.alert_title, &event.data)
            .and_then(|title| render(&self.alert_description, &event.data).map(|d| (title, d)));

        let (title, description) = match rendered {
            Ok(parts) => parts,
            Err(key) => (
                format!("[{}] {}", self.id, self.name),
                format!("incomplete event data for alert template (missing `{key}`)"),
            ),
        };

        Alert::new(&self.id, self.severity, title, description, event.clone())
    }
}

/// Substitute `{field}` placeholders from event data.
///
/// Returns the first missing key as the error. A `{` without a closing
/// brace is copied through verbatim.
pub(crate) fn render(template: &str, data: &EventData) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        match rest[start + 1..].find('}') {
            Some(len) => {
                let key = &rest[start + 1..start + 1 + len];
                match data.get(key) {
                    Some(value) => out.push_str(&value.to_string()),
                    None => return Err(key.to_string()),
                }
                rest = &rest[start + len + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                return Ok(out);
            }
        }
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
#[path = "rule_tests.rs"]
mod tests;
