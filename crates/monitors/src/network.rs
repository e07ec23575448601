// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listening-socket monitor.
//!
//! Keeps a snapshot of `(proto, port, pid)` keys and emits `new_listener`
//! for keys that appear after the setup baseline. OS-assigned ephemeral
//! ports and an explicit ignore set (the dashboard's own port) are absorbed
//! into the snapshot without emission.

use crate::monitor::{Monitor, MonitorError};
use async_trait::async_trait;
use sentinel_adapters::{ProcessProbe, Proto, SocketProbe};
use sentinel_core::{data, Event};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info};

/// Start of the OS-assigned dynamic port range.
pub const EPHEMERAL_PORT_START: u16 = 49152;

type ListenerKey = (Proto, u16, u32);

pub struct NetworkMonitor<S, P> {
    interval: Duration,
    sockets: S,
    processes: P,
    /// Lower-cased trusted process names
    trusted: HashSet<String>,
    ignored_ports: HashSet<u16>,
    ignore_ephemeral: bool,
    known: HashSet<ListenerKey>,
    pid_names: HashMap<u32, String>,
}

impl<S: SocketProbe, P: ProcessProbe> NetworkMonitor<S, P> {
    pub fn new(
        interval: Duration,
        sockets: S,
        processes: P,
        trusted_processes: &[String],
        ignored_ports: HashSet<u16>,
    ) -> Self {
        Self {
            interval,
            sockets,
            processes,
            trusted: trusted_processes.iter().map(|p| p.to_lowercase()).collect(),
            ignored_ports,
            ignore_ephemeral: true,
            known: HashSet::new(),
            pid_names: HashMap::new(),
        }
    }

    async fn refresh_pid_names(&mut self) {
        match self.processes.processes().await {
            Ok(processes) => {
                self.pid_names = processes.into_iter().map(|p| (p.pid, p.name)).collect();
            }
            Err(err) => {
                // keep the stale map; names degrade to "unknown" only for new pids
                debug!(error = %err, "pid name refresh failed");
            }
        }
    }

    fn process_name(&self, pid: u32) -> String {
        self.pid_names
            .get(&pid)
            .cloned()
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[async_trait]
impl<S: SocketProbe, P: ProcessProbe> Monitor for NetworkMonitor<S, P> {
    fn name(&self) -> &'static str {
        "network"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn setup(&mut self) -> Result<(), MonitorError> {
        let listeners = self.sockets.listeners().await?;
        self.known = listeners
            .iter()
            .map(|l| (l.proto, l.local_port, l.pid))
            .collect();
        self.refresh_pid_names().await;
        info!(baseline = self.known.len(), "listener baseline captured");
        Ok(())
    }

    async fn poll(&mut self) -> Result<Vec<Event>, MonitorError> {
        let listeners = self.sockets.listeners().await?;
        self.refresh_pid_names().await;

        let mut current = HashSet::with_capacity(listeners.len());
        let mut events = Vec::new();

        for listener in &listeners {
            let key = (listener.proto, listener.local_port, listener.pid);
            current.insert(key);

            if self.known.contains(&key) {
                continue;
            }
            if self.ignored_ports.contains(&listener.local_port) {
                continue;
            }
            if self.ignore_ephemeral && listener.local_port >= EPHEMERAL_PORT_START {
                continue;
            }

            let process = self.process_name(listener.pid);
            let trusted = self.trusted.contains(&process.to_lowercase());

            events.push(Event::new(
                "network",
                "new_listener",
                data! {
                    "proto" => listener.proto.to_string(),
                    "local_addr" => listener.local_addr.clone(),
                    "local_port" => listener.local_port,
                    "pid" => listener.pid,
                    "process" => process,
                    "state" => "LISTENING",
                    "trusted" => trusted,
                },
            ));
        }

        self.known = current;
        Ok(events)
    }

    fn state(&self) -> serde_json::Value {
        let mut listeners: Vec<_> = self
            .known
            .iter()
            .map(|&(proto, port, pid)| {
                let process = self.process_name(pid);
                let trusted = self.trusted.contains(&process.to_lowercase());
                json!({
                    "proto": proto.to_string(),
                    "local_port": port,
                    "pid": pid,
                    "process": process,
                    "trusted": trusted,
                })
            })
            .collect();
        listeners.sort_by_key(|l| l["local_port"].as_u64());

        json!({
            "listeners": listeners,
            "total": self.known.len(),
        })
    }
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;
