// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for the spec tests.

use sentinel_adapters::FakeNotifyAdapter;
use sentinel_core::{AlertsConfig, FakeClock};
use sentinel_engine::AlertPipeline;
use sentinel_intel::FakeEnrich;
use sentinel_rules::Catalog;
use sentinel_storage::AlertJournal;
use std::io::Write;
use std::path::PathBuf;

pub const NET_SUSP_RULES: &str = r#"
rules:
  - id: NET-SUSP
    name: Suspicious listener
    description: untrusted process opened a non-system port
    severity: HIGH
    source: network
    event_type: new_listener
    conditions:
      - field: trusted
        op: eq
        value: false
      - field: local_port
        op: gte
        value: 1024
    alert_title: "Listener on port {local_port}"
    alert_description: "{process} is listening on {local_port}"
"#;

pub fn write_rules(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.yaml");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(contents.as_bytes())
        .unwrap();
    (dir, path)
}

pub fn load_catalog(contents: &str) -> Catalog {
    let (_dir, path) = write_rules(contents);
    Catalog::load(&path).unwrap()
}

/// A pipeline over fakes plus handles to observe it.
pub struct PipelineFixture {
    pub pipeline: AlertPipeline<FakeEnrich, FakeNotifyAdapter, FakeClock>,
    pub enricher: FakeEnrich,
    pub notifier: FakeNotifyAdapter,
    pub clock: FakeClock,
    pub journal_path: PathBuf,
    pub _dir: tempfile::TempDir,
}

pub fn pipeline_fixture(config: AlertsConfig) -> PipelineFixture {
    let dir = tempfile::tempdir().unwrap();
    let journal_path = dir.path().join("alerts.jsonl");
    let enricher = FakeEnrich::new();
    let notifier = FakeNotifyAdapter::new();
    let clock = FakeClock::new();
    let pipeline = AlertPipeline::new(
        config,
        enricher.clone(),
        AlertJournal::open(&journal_path).unwrap(),
        notifier.clone(),
        clock.clone(),
    );

    PipelineFixture {
        pipeline,
        enricher,
        notifier,
        clock,
        journal_path,
        _dir: dir,
    }
}
