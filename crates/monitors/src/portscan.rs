// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Port-scan detection over a sliding window.
//!
//! Every established inbound connection records `(timestamp, local_port)`
//! under its remote IP. An IP that touches more than `threshold` distinct
//! local ports within `window` fires `port_scan_detected` once; it is then
//! latched and re-arms only when its window empties.

use crate::monitor::{Monitor, MonitorError};
use async_trait::async_trait;
use sentinel_adapters::SocketProbe;
use sentinel_core::{data, Clock, Event};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::{Duration, Instant};

pub const DEFAULT_THRESHOLD: usize = 10;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(120);

/// Loopback/unspecified remotes that can never be a scanner
const LOCAL_REMOTES: [&str; 3] = ["127.0.0.1", "::1", "0.0.0.0"];

/// Number of ports included in the alert sample
const SAMPLE_PORTS: usize = 20;

pub struct PortScanMonitor<S, C> {
    interval: Duration,
    sockets: S,
    clock: C,
    threshold: usize,
    window: Duration,
    hits: HashMap<String, Vec<(Instant, u16)>>,
    alerted: HashSet<String>,
}

impl<S: SocketProbe, C: Clock> PortScanMonitor<S, C> {
    pub fn new(interval: Duration, sockets: S, clock: C) -> Self {
        Self::with_limits(interval, sockets, clock, DEFAULT_THRESHOLD, DEFAULT_WINDOW)
    }

    pub fn with_limits(
        interval: Duration,
        sockets: S,
        clock: C,
        threshold: usize,
        window: Duration,
    ) -> Self {
        Self {
            interval,
            sockets,
            clock,
            threshold,
            window,
            hits: HashMap::new(),
            alerted: HashSet::new(),
        }
    }
}

#[async_trait]
impl<S: SocketProbe, C: Clock> Monitor for PortScanMonitor<S, C> {
    fn name(&self) -> &'static str {
        "portscan"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn poll(&mut self) -> Result<Vec<Event>, MonitorError> {
        let now = self.clock.now();
        let connections = self.sockets.established().await?;

        for conn in connections {
            if LOCAL_REMOTES.contains(&conn.remote_addr.as_str()) {
                continue;
            }
            self.hits
                .entry(conn.remote_addr)
                .or_default()
                .push((now, conn.local_port));
        }

        // Evict stale entries; an IP whose window empties re-arms
        let window = self.window;
        let alerted = &mut self.alerted;
        self.hits.retain(|ip, entries| {
            entries.retain(|&(ts, _)| now.duration_since(ts) <= window);
            if entries.is_empty() {
                alerted.remove(ip);
                false
            } else {
                true
            }
        });

        let mut events = Vec::new();
        let mut newly_alerted = Vec::new();

        for (ip, entries) in &self.hits {
            if self.alerted.contains(ip) {
                continue;
            }
            let unique: BTreeSet<u16> = entries.iter().map(|&(_, port)| port).collect();
            if unique.len() <= self.threshold {
                continue;
            }

            let sample = unique
                .iter()
                .take(SAMPLE_PORTS)
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(",");

            events.push(Event::new(
                "portscan",
                "port_scan_detected",
                data! {
                    "remote_ip" => ip.clone(),
                    "unique_ports" => unique.len() as i64,
                    "window_seconds" => self.window.as_secs() as i64,
                    "sample_ports" => sample,
                },
            ));
            newly_alerted.push(ip.clone());
        }

        self.alerted.extend(newly_alerted);
        Ok(events)
    }
}

#[cfg(test)]
#[path = "portscan_tests.rs"]
mod tests;
