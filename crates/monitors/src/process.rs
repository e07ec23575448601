// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process monitor.
//!
//! Flags processes whose name is in the hard-coded offensive-tooling set
//! (`suspicious_process`) or whose executable path points at a temp
//! location (`process_from_temp`). A pid alerts at most once while alive;
//! dead pids are pruned from the alerted set every tick.

use crate::monitor::{Monitor, MonitorError};
use async_trait::async_trait;
use sentinel_adapters::ProcessProbe;
use sentinel_core::{data, Event};
use std::collections::HashSet;
use std::time::Duration;
use tracing::info;

/// Tooling commonly seen in post-exploitation, keyed by process name.
pub const SUSPICIOUS_NAMES: &[&str] = &[
    "nc.exe",
    "ncat.exe",
    "netcat.exe",
    "mimikatz.exe",
    "mimi.exe",
    "mimi32.exe",
    "mimi64.exe",
    "psexec.exe",
    "psexec64.exe",
    "procdump.exe",
    "procdump64.exe",
    "lazagne.exe",
    "bloodhound.exe",
    "sharphound.exe",
    "rubeus.exe",
    "certify.exe",
    "chisel.exe",
    "plink.exe",
    "cobaltstrike.exe",
    "beacon.exe",
    "wce.exe",
    "pwdump.exe",
    "fgdump.exe",
    "keylogger.exe",
];

/// Path fragments that mark execution from a temp location.
pub const TEMP_PATH_INDICATORS: &[&str] = &[
    "\\temp\\",
    "\\tmp\\",
    "\\appdata\\local\\temp\\",
    "\\windows\\temp\\",
    "$recycle.bin",
];

pub struct ProcessMonitor<P> {
    interval: Duration,
    probe: P,
    /// Lower-cased trusted process names
    trusted: HashSet<String>,
    /// Lower-cased names seen at setup
    baseline: HashSet<String>,
    alerted_pids: HashSet<u32>,
}

impl<P: ProcessProbe> ProcessMonitor<P> {
    pub fn new(interval: Duration, probe: P, trusted_processes: &[String]) -> Self {
        Self {
            interval,
            probe,
            trusted: trusted_processes.iter().map(|p| p.to_lowercase()).collect(),
            baseline: HashSet::new(),
            alerted_pids: HashSet::new(),
        }
    }
}

fn is_temp_path(path: &str) -> bool {
    let path = path.to_lowercase();
    TEMP_PATH_INDICATORS
        .iter()
        .any(|indicator| path.contains(indicator))
}

#[async_trait]
impl<P: ProcessProbe> Monitor for ProcessMonitor<P> {
    fn name(&self) -> &'static str {
        "process"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn setup(&mut self) -> Result<(), MonitorError> {
        let processes = self.probe.processes().await?;
        self.baseline = processes.iter().map(|p| p.name.to_lowercase()).collect();
        info!(baseline = self.baseline.len(), "process baseline captured");
        Ok(())
    }

    async fn poll(&mut self) -> Result<Vec<Event>, MonitorError> {
        let processes = self.probe.processes().await?;
        let mut current_pids = HashSet::with_capacity(processes.len());
        let mut events = Vec::new();

        for process in &processes {
            let name_lower = process.name.to_lowercase();
            current_pids.insert(process.pid);

            if self.alerted_pids.contains(&process.pid) {
                continue;
            }
            if self.trusted.contains(&name_lower) {
                continue;
            }

            if SUSPICIOUS_NAMES.contains(&name_lower.as_str()) {
                self.alerted_pids.insert(process.pid);
                events.push(Event::new(
                    "process",
                    "suspicious_process",
                    data! {
                        "process" => process.name.clone(),
                        "pid" => process.pid,
                        "reason" => "suspicious_name",
                        "session" => process.session.clone(),
                        "mem_usage" => process.mem_usage.clone(),
                    },
                ));
                continue;
            }

            if !process.path.is_empty() && is_temp_path(&process.path) {
                self.alerted_pids.insert(process.pid);
                events.push(Event::new(
                    "process",
                    "process_from_temp",
                    data! {
                        "process" => process.name.clone(),
                        "pid" => process.pid,
                        "path" => process.path.clone(),
                        "reason" => "temp_path",
                    },
                ));
            }
        }

        // GC: a pid that died may be reused later
        self.alerted_pids.retain(|pid| current_pids.contains(pid));

        Ok(events)
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
