// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted fake probes for monitor tests.
//!
//! Each fake returns whatever was last set on it, so a test can change the
//! observed OS state between polls. `set_fail` makes the next calls error,
//! for exercising the skip-tick path.

use crate::probe::{
    EstablishedConn, EventLogProbe, ListenerRecord, LogRecord, ProbeError, ProcessProbe,
    ProcessRecord, SocketProbe,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

fn scripted_error() -> ProbeError {
    ProbeError::Command("scripted probe failure".to_string())
}

/// Fake socket probe
#[derive(Clone, Default)]
pub struct FakeSocketProbe {
    listeners: Arc<Mutex<Vec<ListenerRecord>>>,
    established: Arc<Mutex<Vec<EstablishedConn>>>,
    fail: Arc<Mutex<bool>>,
}

impl FakeSocketProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_listeners(&self, listeners: Vec<ListenerRecord>) {
        *self.listeners.lock() = listeners;
    }

    pub fn set_established(&self, connections: Vec<EstablishedConn>) {
        *self.established.lock() = connections;
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock() = fail;
    }
}

#[async_trait]
impl SocketProbe for FakeSocketProbe {
    async fn listeners(&self) -> Result<Vec<ListenerRecord>, ProbeError> {
        if *self.fail.lock() {
            return Err(scripted_error());
        }
        Ok(self.listeners.lock().clone())
    }

    async fn established(&self) -> Result<Vec<EstablishedConn>, ProbeError> {
        if *self.fail.lock() {
            return Err(scripted_error());
        }
        Ok(self.established.lock().clone())
    }
}

/// Fake process probe
#[derive(Clone, Default)]
pub struct FakeProcessProbe {
    processes: Arc<Mutex<Vec<ProcessRecord>>>,
    fail: Arc<Mutex<bool>>,
}

impl FakeProcessProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_processes(&self, processes: Vec<ProcessRecord>) {
        *self.processes.lock() = processes;
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock() = fail;
    }
}

#[async_trait]
impl ProcessProbe for FakeProcessProbe {
    async fn processes(&self) -> Result<Vec<ProcessRecord>, ProbeError> {
        if *self.fail.lock() {
            return Err(scripted_error());
        }
        Ok(self.processes.lock().clone())
    }
}

/// Fake event-log probe keyed by channel
#[derive(Clone, Default)]
pub struct FakeEventLogProbe {
    counts: Arc<Mutex<HashMap<String, u64>>>,
    records: Arc<Mutex<HashMap<String, Vec<LogRecord>>>>,
    unreachable: Arc<Mutex<Vec<String>>>,
}

impl FakeEventLogProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_count(&self, channel: &str, count: u64) {
        self.counts.lock().insert(channel.to_string(), count);
    }

    pub fn set_records(&self, channel: &str, records: Vec<LogRecord>) {
        self.records.lock().insert(channel.to_string(), records);
    }

    /// Make a channel error on access, like a privileged channel would.
    pub fn set_unreachable(&self, channel: &str) {
        self.unreachable.lock().push(channel.to_string());
    }

    fn check_reachable(&self, channel: &str) -> Result<(), ProbeError> {
        if self.unreachable.lock().iter().any(|c| c == channel) {
            return Err(ProbeError::Command(format!("access denied: {channel}")));
        }
        Ok(())
    }
}

#[async_trait]
impl EventLogProbe for FakeEventLogProbe {
    async fn record_count(&self, channel: &str) -> Result<u64, ProbeError> {
        self.check_reachable(channel)?;
        Ok(self.counts.lock().get(channel).copied().unwrap_or(0))
    }

    async fn read_since(
        &self,
        channel: &str,
        after: u64,
    ) -> Result<Vec<LogRecord>, ProbeError> {
        self.check_reachable(channel)?;
        Ok(self
            .records
            .lock()
            .get(channel)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.record_no > after)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
