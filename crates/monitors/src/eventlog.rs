// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OS event-log monitor.
//!
//! Watches a fixed set of channels for a whitelist of record ids:
//!
//! - Security 4625 (failed login), 7045 (service installed)
//! - Windows Defender 5001 (real-time protection disabled)
//! - PowerShell 4104 (script block logging)
//!
//! Each channel keeps a bookmark seeded with the record count at setup, so
//! history never alerts. Without elevation the Security channel is dropped
//! and the monitor reports itself as degraded rather than failing.

use crate::monitor::{Health, Monitor, MonitorError};
use async_trait::async_trait;
use sentinel_adapters::{EventLogProbe, LogRecord};
use sentinel_core::{Event, EventData, Scalar};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

/// Channel → (record id → event type)
const CHANNELS: &[(&str, &[(u32, &str)])] = &[
    (
        "Security",
        &[(4625, "failed_login"), (7045, "service_installed")],
    ),
    (
        "Microsoft-Windows-Windows Defender/Operational",
        &[(5001, "defender_disabled")],
    ),
    (
        "Microsoft-Windows-PowerShell/Operational",
        &[(4104, "powershell_script_block")],
    ),
];

/// Channels readable without elevation
const UNPRIVILEGED_CHANNELS: &[&str] = &[
    "Microsoft-Windows-Windows Defender/Operational",
    "Microsoft-Windows-PowerShell/Operational",
];

/// Longest script-block fragment carried in an event
const SCRIPT_BLOCK_LIMIT: usize = 500;

pub struct EventLogMonitor<L> {
    interval: Duration,
    probe: L,
    elevated: bool,
    /// channel → highest consumed record number
    bookmarks: BTreeMap<&'static str, u64>,
}

impl<L: EventLogProbe> EventLogMonitor<L> {
    pub fn new(interval: Duration, probe: L, elevated: bool) -> Self {
        Self {
            interval,
            probe,
            elevated,
            bookmarks: BTreeMap::new(),
        }
    }

    fn channels(&self) -> impl Iterator<Item = (&'static str, &'static [(u32, &'static str)])> {
        let elevated = self.elevated;
        CHANNELS.iter().copied().filter(move |(channel, _)| {
            elevated || UNPRIVILEGED_CHANNELS.contains(channel)
        })
    }

    fn interest(channel: &str) -> &'static [(u32, &'static str)] {
        CHANNELS
            .iter()
            .find(|(name, _)| *name == channel)
            .map(|(_, table)| *table)
            .unwrap_or(&[])
    }
}

#[async_trait]
impl<L: EventLogProbe> Monitor for EventLogMonitor<L> {
    fn name(&self) -> &'static str {
        "eventlog"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn health(&self) -> Health {
        if self.elevated {
            Health::On
        } else {
            Health::Degraded
        }
    }

    async fn setup(&mut self) -> Result<(), MonitorError> {
        let channels: Vec<&'static str> = self.channels().map(|(channel, _)| channel).collect();
        for channel in channels {
            match self.probe.record_count(channel).await {
                Ok(count) => {
                    self.bookmarks.insert(channel, count);
                    debug!(channel, bookmark = count, "channel bookmarked");
                }
                Err(err) => {
                    debug!(channel, error = %err, "channel not accessible, skipping");
                }
            }
        }
        info!(channels = self.bookmarks.len(), elevated = self.elevated, "event log monitor ready");
        Ok(())
    }

    async fn poll(&mut self) -> Result<Vec<Event>, MonitorError> {
        let mut events = Vec::new();

        let channels: Vec<(&'static str, u64)> =
            self.bookmarks.iter().map(|(&c, &b)| (c, b)).collect();

        for (channel, bookmark) in channels {
            let records = match self.probe.read_since(channel, bookmark).await {
                Ok(records) => records,
                Err(err) => {
                    debug!(channel, error = %err, "channel read failed");
                    continue;
                }
            };

            let interest = Self::interest(channel);
            let mut max_record = bookmark;

            for record in records {
                if record.record_no <= bookmark {
                    continue;
                }
                max_record = max_record.max(record.record_no);

                let event_type = match interest
                    .iter()
                    .find(|(id, _)| *id == record.event_id)
                {
                    Some((_, event_type)) => *event_type,
                    None => continue,
                };

                events.push(Event::new(
                    "eventlog",
                    event_type,
                    extract_record_data(&record, channel),
                ));
            }

            if max_record > bookmark {
                self.bookmarks.insert(channel, max_record);
            }
        }

        Ok(events)
    }
}

/// Positional insertion-string slot, `"unknown"` when absent.
fn slot(record: &LogRecord, index: usize) -> String {
    record
        .strings
        .get(index)
        .cloned()
        .unwrap_or_else(|| "unknown".to_string())
}

/// Map a whitelisted record to event data. Slot positions are fixed by the
/// OS event schema per record id.
fn extract_record_data(record: &LogRecord, channel: &str) -> EventData {
    let mut data = EventData::new();
    data.insert("event_id".to_string(), Scalar::from(record.event_id));
    data.insert("channel".to_string(), Scalar::from(channel));

    match record.event_id {
        4625 => {
            data.insert("target_user".to_string(), Scalar::from(slot(record, 5)));
            data.insert("workstation".to_string(), Scalar::from(slot(record, 13)));
            data.insert("ip_address".to_string(), Scalar::from(slot(record, 19)));
            data.insert("logon_type".to_string(), Scalar::from(slot(record, 10)));
        }
        7045 => {
            data.insert("service_name".to_string(), Scalar::from(slot(record, 0)));
            data.insert("service_path".to_string(), Scalar::from(slot(record, 1)));
            data.insert("service_type".to_string(), Scalar::from(slot(record, 2)));
            data.insert("service_start".to_string(), Scalar::from(slot(record, 3)));
        }
        5001 => {
            let component = record
                .strings
                .first()
                .cloned()
                .unwrap_or_else(|| "Real-time Protection".to_string());
            data.insert("component".to_string(), Scalar::from(component));
        }
        4104 => {
            let script: String = record
                .strings
                .get(2)
                .map(|s| s.chars().take(SCRIPT_BLOCK_LIMIT).collect())
                .unwrap_or_default();
            data.insert("script_block".to_string(), Scalar::from(script));
            data.insert(
                "script_path".to_string(),
                Scalar::from(record.strings.get(4).cloned().unwrap_or_default()),
            );
        }
        _ => {}
    }

    data
}

#[cfg(test)]
#[path = "eventlog_tests.rs"]
mod tests;
