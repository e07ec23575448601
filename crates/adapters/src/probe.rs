// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Probe traits and the records they return.
//!
//! A probe is a snapshot reader: it returns what the OS reports right now
//! and keeps no state of its own. All diffing against previous snapshots
//! happens in the monitors.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Errors from probe execution
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Probe command failed to run, timed out, or returned garbage
    #[error("{0}")]
    Command(String),
    /// Filesystem watch registration failed
    #[error("watch setup failed: {0}")]
    Watch(#[from] notify::Error),
}

/// Transport protocol of a listening socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Proto {
    Tcp,
    Udp,
}

impl fmt::Display for Proto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Proto::Tcp => f.write_str("TCP"),
            Proto::Udp => f.write_str("UDP"),
        }
    }
}

/// One listening socket as reported by the OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerRecord {
    pub proto: Proto,
    pub local_addr: String,
    pub local_port: u16,
    pub pid: u32,
}

/// One established inbound TCP connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstablishedConn {
    pub remote_addr: String,
    pub local_port: u16,
}

/// One running process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub name: String,
    pub pid: u32,
    pub session: String,
    pub mem_usage: String,
    /// Executable path when the OS exposes it; empty otherwise
    pub path: String,
}

/// One OS event-log record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub record_no: u64,
    pub event_id: u32,
    /// Positional insertion strings; meaning depends on the event id
    pub strings: Vec<String>,
}

/// Reads the socket tables
#[async_trait]
pub trait SocketProbe: Clone + Send + Sync + 'static {
    async fn listeners(&self) -> Result<Vec<ListenerRecord>, ProbeError>;
    async fn established(&self) -> Result<Vec<EstablishedConn>, ProbeError>;
}

/// Lists running processes
#[async_trait]
pub trait ProcessProbe: Clone + Send + Sync + 'static {
    async fn processes(&self) -> Result<Vec<ProcessRecord>, ProbeError>;
}

/// Reads OS event-log channels
#[async_trait]
pub trait EventLogProbe: Clone + Send + Sync + 'static {
    /// Current record count of a channel, used to bookmark at startup
    async fn record_count(&self, channel: &str) -> Result<u64, ProbeError>;
    /// Records with a record number strictly above `after`
    async fn read_since(&self, channel: &str, after: u64)
        -> Result<Vec<LogRecord>, ProbeError>;
}
