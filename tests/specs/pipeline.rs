// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dedup, throttle and enrichment-gate specs for the alert pipeline.

use crate::prelude::*;
use sentinel_core::{data, Alert, AlertsConfig, Event, OllamaConfig, Severity};
use sentinel_engine::AlertPipeline;
use sentinel_intel::Enricher;
use sentinel_storage::{read_all, AlertJournal};
use std::time::Duration;

fn alert(rule_id: &str, port: i64) -> Alert {
    Alert::new(
        rule_id,
        Severity::High,
        "Suspicious listener",
        "a process opened a port",
        Event::new("network", "new_listener", data! { "local_port" => port }),
    )
}

#[tokio::test]
async fn identical_alerts_ten_seconds_apart_journal_once() {
    let mut fx = pipeline_fixture(AlertsConfig::default()); // dedup_window 300

    assert!(fx.pipeline.process(&mut alert("NET-SUSP", 4444)).await);
    fx.clock.advance(Duration::from_secs(10));
    assert!(!fx.pipeline.process(&mut alert("NET-SUSP", 4444)).await);

    let journaled = read_all(&fx.journal_path).unwrap();
    assert_eq!(journaled.len(), 1);
}

#[tokio::test]
async fn same_rule_thirty_seconds_apart_is_throttled() {
    let mut fx = pipeline_fixture(AlertsConfig::default()); // throttle 60

    // different fingerprints, same rule
    assert!(fx.pipeline.process(&mut alert("NET-SUSP", 4444)).await);
    fx.clock.advance(Duration::from_secs(30));
    assert!(!fx.pipeline.process(&mut alert("NET-SUSP", 5555)).await);

    assert_eq!(read_all(&fx.journal_path).unwrap().len(), 1);
}

#[tokio::test]
async fn low_severity_skips_enrichment_but_still_journals() {
    // a real enricher with the default MEDIUM gate
    let dir = tempfile::tempdir().unwrap();
    let journal_path = dir.path().join("alerts.jsonl");
    let mut pipeline = AlertPipeline::new(
        AlertsConfig::default(),
        Enricher::new(OllamaConfig::default()),
        AlertJournal::open(&journal_path).unwrap(),
        sentinel_adapters::FakeNotifyAdapter::new(),
        sentinel_core::FakeClock::new(),
    );

    let mut low = Alert::new(
        "FS-NOTE",
        Severity::Low,
        "File changed",
        "a watched file changed",
        Event::new("filesystem", "file_modified", data! { "file_name" => "hosts" }),
    );

    assert!(pipeline.process(&mut low).await);
    assert_eq!(low.llm_explanation, None);

    let journaled = read_all(&journal_path).unwrap();
    assert_eq!(journaled.len(), 1);
    assert_eq!(journaled[0].llm_explanation, None);
}

#[tokio::test]
async fn enrichment_lands_in_the_journal_line() {
    let mut fx = pipeline_fixture(AlertsConfig::default());
    fx.enricher.respond_with("actividad de escaneo");

    assert!(fx.pipeline.process(&mut alert("SCAN-1", 1)).await);

    let journaled = read_all(&fx.journal_path).unwrap();
    assert_eq!(
        journaled[0].llm_explanation.as_deref(),
        Some("actividad de escaneo")
    );
}

#[tokio::test]
async fn journal_lines_round_trip_through_the_reader() {
    let mut fx = pipeline_fixture(AlertsConfig::default());

    let mut original = alert("NET-SUSP", 4444);
    assert!(fx.pipeline.process(&mut original).await);

    let journaled = read_all(&fx.journal_path).unwrap();
    assert_eq!(journaled[0], original);
}
