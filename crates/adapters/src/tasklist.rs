// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process probe backed by `tasklist /FO CSV /NH`, with best-effort
//! executable-path enrichment via `wmic`.
//!
//! tasklist rows look like:
//!
//! ```text
//! "svchost.exe","1040","Services","0","9,312 K"
//! ```
//!
//! tasklist never reports the executable path, so a second `wmic process`
//! query fills it in where available. wmic being absent or failing leaves
//! paths empty and is not an error.

use crate::probe::{ProbeError, ProcessProbe, ProcessRecord};
use crate::subprocess::{run_with_timeout, PROBE_TIMEOUT};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::process::Command;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default)]
pub struct TasklistProbe;

impl TasklistProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessProbe for TasklistProbe {
    async fn processes(&self) -> Result<Vec<ProcessRecord>, ProbeError> {
        let mut cmd = Command::new("tasklist");
        cmd.args(["/FO", "CSV", "/NH"]);
        let output = run_with_timeout(cmd, PROBE_TIMEOUT, "tasklist")
            .await
            .map_err(ProbeError::Command)?;

        let mut processes = parse_tasklist(&String::from_utf8_lossy(&output.stdout));

        let mut wmic = Command::new("wmic");
        wmic.args(["process", "get", "ProcessId,ExecutablePath", "/format:csv"]);
        match run_with_timeout(wmic, PROBE_TIMEOUT, "wmic process").await {
            Ok(output) => {
                let paths = parse_wmic_paths(&String::from_utf8_lossy(&output.stdout));
                for process in &mut processes {
                    if let Some(path) = paths.get(&process.pid) {
                        process.path = path.clone();
                    }
                }
            }
            Err(error) => {
                debug!(%error, "wmic path enrichment unavailable");
            }
        }

        Ok(processes)
    }
}

/// Parse `tasklist /FO CSV /NH` output.
pub fn parse_tasklist(output: &str) -> Vec<ProcessRecord> {
    let mut processes = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if !line.starts_with('"') {
            continue;
        }

        let parts: Vec<&str> = line.split("\",\"").collect();
        if parts.len() < 5 {
            continue;
        }

        let name = parts[0].trim_start_matches('"');
        let pid = match parts[1].parse::<u32>() {
            Ok(pid) => pid,
            Err(_) => continue,
        };

        processes.push(ProcessRecord {
            name: name.to_string(),
            pid,
            session: parts[2].to_string(),
            mem_usage: parts[4].trim_end_matches('"').to_string(),
            path: String::new(),
        });
    }

    processes
}

/// Parse `wmic process get ProcessId,ExecutablePath /format:csv` into a
/// pid → path map. Row format: `Node,ExecutablePath,ProcessId`.
pub fn parse_wmic_paths(output: &str) -> HashMap<u32, String> {
    let mut paths = HashMap::new();

    for line in output.lines() {
        let parts: Vec<&str> = line.trim().split(',').collect();
        if parts.len() < 3 {
            continue;
        }
        let path = parts[1].trim();
        if path.is_empty() || path == "ExecutablePath" {
            continue;
        }
        if let Ok(pid) = parts[2].trim().parse::<u32>() {
            paths.insert(pid, path.to_string());
        }
    }

    paths
}

#[cfg(test)]
#[path = "tasklist_tests.rs"]
mod tests;
