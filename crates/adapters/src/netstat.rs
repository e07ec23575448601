// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket probe backed by `netstat -ano`.
//!
//! Typical output:
//!
//! ```text
//!   Proto  Local Address          Foreign Address        State           PID
//!   TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       1234
//!   TCP    [::]:445               [::]:0                 LISTENING       4
//!   TCP    10.0.0.5:49811         93.184.216.34:443      ESTABLISHED     884
//!   UDP    0.0.0.0:5353           *:*                                    5678
//! ```
//!
//! TCP rows are filtered by state; UDP has no state column, so every UDP
//! row counts as a listener and the PID is the last field.

use crate::probe::{EstablishedConn, ListenerRecord, ProbeError, Proto, SocketProbe};
use crate::subprocess::{run_with_timeout, PROBE_TIMEOUT};
use async_trait::async_trait;
use tokio::process::Command;

#[derive(Clone, Copy, Debug, Default)]
pub struct NetstatProbe;

impl NetstatProbe {
    pub fn new() -> Self {
        Self
    }

    async fn output(&self) -> Result<String, ProbeError> {
        let mut cmd = Command::new("netstat");
        cmd.arg("-ano");
        let output = run_with_timeout(cmd, PROBE_TIMEOUT, "netstat -ano")
            .await
            .map_err(ProbeError::Command)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl SocketProbe for NetstatProbe {
    async fn listeners(&self) -> Result<Vec<ListenerRecord>, ProbeError> {
        Ok(parse_listeners(&self.output().await?))
    }

    async fn established(&self) -> Result<Vec<EstablishedConn>, ProbeError> {
        Ok(parse_established(&self.output().await?))
    }
}

/// Extract listeners (TCP LISTENING rows plus every UDP row).
pub fn parse_listeners(output: &str) -> Vec<ListenerRecord> {
    let mut listeners = Vec::new();

    for line in output.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }

        let (proto, pid_field) = match parts[0].to_ascii_uppercase().as_str() {
            "TCP" => {
                if parts.len() < 5 || parts[3] != "LISTENING" {
                    continue;
                }
                (Proto::Tcp, parts[4])
            }
            "UDP" => (Proto::Udp, parts[parts.len() - 1]),
            _ => continue,
        };

        let (addr, port) = match split_host_port(parts[1]) {
            Some(pair) => pair,
            None => continue,
        };
        let pid = match pid_field.parse::<u32>() {
            Ok(pid) => pid,
            Err(_) => continue,
        };

        listeners.push(ListenerRecord {
            proto,
            local_addr: addr.to_string(),
            local_port: port,
            pid,
        });
    }

    listeners
}

/// Extract established TCP connections as (remote address, local port).
pub fn parse_established(output: &str) -> Vec<EstablishedConn> {
    let mut connections = Vec::new();

    for line in output.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            continue;
        }
        if !parts[0].eq_ignore_ascii_case("TCP") || parts[3] != "ESTABLISHED" {
            continue;
        }

        let local_port = match split_host_port(parts[1]) {
            Some((_, port)) => port,
            None => continue,
        };
        let remote_addr = match split_host_port(parts[2]) {
            Some((addr, _)) => addr.trim_matches(['[', ']']).to_string(),
            None => continue,
        };

        connections.push(EstablishedConn {
            remote_addr,
            local_port,
        });
    }

    connections
}

/// Split `addr:port`, tolerating bracketed IPv6 (`[::]:445`).
fn split_host_port(s: &str) -> Option<(&str, u16)> {
    let (addr, port) = s.rsplit_once(':')?;
    Some((addr, port.parse().ok()?))
}

#[cfg(test)]
#[path = "netstat_tests.rs"]
mod tests;
