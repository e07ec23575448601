// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rule catalog loading and evaluation.
//!
//! The catalog is loaded once at startup. One malformed entry never aborts
//! the load: it is logged and skipped. Only a missing file or a broken
//! top-level shape is fatal.

use crate::rule::{CondValue, Condition, Op, Rule};
use sentinel_core::{Alert, Event, Severity};
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Errors from catalog loading
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("rules file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid rules file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    rules: Vec<serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    severity: String,
    source: String,
    event_type: String,
    #[serde(default)]
    conditions: Vec<RawCondition>,
    #[serde(default)]
    alert_title: Option<String>,
    #[serde(default)]
    alert_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCondition {
    field: String,
    op: String,
    value: CondValue,
}

/// The loaded rule catalog
#[derive(Debug, Default)]
pub struct Catalog {
    rules: Vec<Rule>,
}

impl Catalog {
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Load rules from a YAML file (`rules:` list).
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::NotFound(path.to_owned()));
        }

        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_owned(),
            source,
        })?;
        let raw: RawCatalog =
            serde_yaml::from_str(&text).map_err(|source| CatalogError::Parse {
                path: path.to_owned(),
                source,
            })?;

        let mut rules = Vec::with_capacity(raw.rules.len());
        for entry in raw.rules {
            // Best-effort id for the skip warning before the entry is consumed
            let entry_id = entry
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or("?")
                .to_string();

            let parsed: RawRule = match serde_yaml::from_value(entry) {
                Ok(r) => r,
                Err(error) => {
                    warn!(rule = %entry_id, %error, "skipping invalid rule entry");
                    continue;
                }
            };

            match build_rule(parsed) {
                Ok(rule) => rules.push(rule),
                Err(error) => {
                    warn!(rule = %entry_id, %error, "skipping invalid rule entry");
                }
            }
        }

        info!(count = rules.len(), path = %path.display(), "rule catalog loaded");
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate an event against every rule, in catalog order.
    pub fn evaluate(&self, event: &Event) -> Vec<Alert> {
        let mut alerts = Vec::new();
        for rule in &self.rules {
            if rule.matches(event) {
                let alert = rule.create_alert(event);
                info!(rule = %rule.id, title = %alert.title, "rule fired");
                alerts.push(alert);
            }
        }
        alerts
    }
}

fn build_rule(raw: RawRule) -> Result<Rule, String> {
    let severity = Severity::from_str(&raw.severity).map_err(|e| e.to_string())?;

    let conditions = raw
        .conditions
        .into_iter()
        .map(|c| Condition {
            field: c.field,
            op: Op::parse(&c.op),
            value: c.value,
        })
        .collect();

    let alert_title = raw.alert_title.unwrap_or_else(|| raw.name.clone());
    let alert_description = raw
        .alert_description
        .unwrap_or_else(|| raw.description.clone());

    Ok(Rule::new(
        raw.id,
        raw.name,
        raw.description,
        severity,
        raw.source,
        raw.event_type,
        conditions,
        alert_title,
        alert_description,
    ))
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
