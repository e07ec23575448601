// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event-log probe backed by `wevtutil`.
//!
//! `wevtutil gli <channel>` reports channel metadata including
//! `numberOfLogRecords`, which seeds the startup bookmark. Queries render
//! events as XML. The fields the monitors care about (EventRecordID,
//! EventID, ordered `<Data>` insertion strings) are pulled out with a
//! small element scanner over the flat machine-generated rendering.

use crate::probe::{EventLogProbe, LogRecord, ProbeError};
use crate::subprocess::{run_with_timeout, PROBE_TIMEOUT};
use async_trait::async_trait;
use tokio::process::Command;

#[derive(Clone, Copy, Debug, Default)]
pub struct WevtutilProbe;

impl WevtutilProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventLogProbe for WevtutilProbe {
    async fn record_count(&self, channel: &str) -> Result<u64, ProbeError> {
        let mut cmd = Command::new("wevtutil");
        cmd.args(["gli", channel]);
        let output = run_with_timeout(cmd, PROBE_TIMEOUT, "wevtutil gli")
            .await
            .map_err(ProbeError::Command)?;
        if !output.status.success() {
            return Err(ProbeError::Command(format!(
                "wevtutil gli {channel}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(parse_record_count(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn read_since(
        &self,
        channel: &str,
        after: u64,
    ) -> Result<Vec<LogRecord>, ProbeError> {
        let query = format!("/q:*[System[EventRecordID > {after}]]");
        let mut cmd = Command::new("wevtutil");
        cmd.args(["qe", channel, "/f:xml"]).arg(&query);
        let output = run_with_timeout(cmd, PROBE_TIMEOUT, "wevtutil qe")
            .await
            .map_err(ProbeError::Command)?;
        if !output.status.success() {
            return Err(ProbeError::Command(format!(
                "wevtutil qe {channel}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(parse_events(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Pull `numberOfLogRecords` out of `wevtutil gli` output. Missing ⇒ 0.
pub fn parse_record_count(output: &str) -> u64 {
    for line in output.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("numberOfLogRecords:") {
            return rest.trim().parse().unwrap_or(0);
        }
    }
    0
}

/// Parse concatenated `<Event>...</Event>` XML renderings.
///
/// Records missing an EventRecordID or EventID are dropped; their absence
/// means the rendering is truncated or not an event at all.
pub fn parse_events(xml: &str) -> Vec<LogRecord> {
    let mut records = Vec::new();

    for chunk in xml.split("</Event>") {
        if !chunk.contains("<Event") {
            continue;
        }

        let record_no = match tag_text(chunk, "EventRecordID").and_then(|t| t.parse().ok()) {
            Some(n) => n,
            None => continue,
        };
        let event_id = match tag_text(chunk, "EventID").and_then(|t| t.parse().ok()) {
            Some(id) => id,
            None => continue,
        };

        records.push(LogRecord {
            record_no,
            event_id,
            strings: data_values(chunk),
        });
    }

    records
}

/// Text content of the first `<tag ...>text</tag>` element.
fn tag_text<'a>(chunk: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut rest = chunk;
    loop {
        let start = rest.find(&open)?;
        let after_name = &rest[start + open.len()..];
        // Guard against a longer tag name sharing the prefix
        match after_name.chars().next() {
            Some('>') | Some(' ') | Some('/') => {}
            _ => {
                rest = after_name;
                continue;
            }
        }
        let content_start = after_name.find('>')?;
        if after_name[..content_start].ends_with('/') {
            // Self-closing: no text
            return Some("");
        }
        let content = &after_name[content_start + 1..];
        let end = content.find(&close)?;
        return Some(&content[..end]);
    }
}

/// Ordered text of every `<Data ...>` element; self-closing elements
/// contribute an empty slot so positional indices stay stable.
fn data_values(chunk: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut rest = chunk;

    while let Some(start) = rest.find("<Data") {
        let after_name = &rest[start + "<Data".len()..];
        match after_name.chars().next() {
            Some('>') | Some(' ') | Some('/') => {}
            _ => {
                rest = after_name;
                continue;
            }
        }
        let content_start = match after_name.find('>') {
            Some(i) => i,
            None => break,
        };
        if after_name[..content_start].ends_with('/') {
            values.push(String::new());
            rest = &after_name[content_start + 1..];
            continue;
        }
        let content = &after_name[content_start + 1..];
        match content.find("</Data>") {
            Some(end) => {
                values.push(unescape_xml(&content[..end]));
                rest = &content[end + "</Data>".len()..];
            }
            None => break,
        }
    }

    values
}

/// Undo the five standard XML entity escapes.
fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
#[path = "wevtutil_tests.rs"]
mod tests;
