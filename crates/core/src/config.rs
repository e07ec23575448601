// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed configuration loaded from a YAML file.
//!
//! Every key is optional; a missing file yields the full default
//! configuration. Only unreadable or malformed YAML is an error, and that
//! error aborts startup.

use crate::severity::Severity;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Settings for one monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl MonitorConfig {
    fn new(interval_secs: u64) -> Self {
        Self {
            enabled: true,
            interval_secs,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Per-monitor settings with per-monitor default intervals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorsConfig {
    pub network: MonitorConfig,
    pub portscan: MonitorConfig,
    pub eventlog: MonitorConfig,
    pub process: MonitorConfig,
    pub filesystem: MonitorConfig,
}

impl Default for MonitorsConfig {
    fn default() -> Self {
        Self {
            network: MonitorConfig::new(15),
            portscan: MonitorConfig::new(10),
            eventlog: MonitorConfig::new(60),
            process: MonitorConfig::new(20),
            filesystem: MonitorConfig::new(5),
        }
    }
}

/// Settings for the Ollama enrichment backend
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
    #[serde(rename = "timeout")]
    pub timeout_secs: u64,
    /// Minimum severity an alert needs before it is sent for enrichment
    pub min_severity: Severity,
    #[serde(rename = "rate_limit")]
    pub rate_limit_secs: f64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "phi3".to_string(),
            timeout_secs: 30,
            min_severity: Severity::Medium,
            rate_limit_secs: 2.0,
        }
    }
}

impl OllamaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_secs_f64(self.rate_limit_secs.max(0.0))
    }
}

/// Settings for the alert pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub log_file: PathBuf,
    pub toast_enabled: bool,
    #[serde(rename = "dedup_window")]
    pub dedup_window_secs: u64,
    #[serde(rename = "throttle_per_rule")]
    pub throttle_per_rule_secs: u64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("alerts.jsonl"),
            toast_enabled: true,
            dedup_window_secs: 300,
            throttle_per_rule_secs: 60,
        }
    }
}

impl AlertsConfig {
    pub fn dedup_window(&self) -> Duration {
        Duration::from_secs(self.dedup_window_secs)
    }

    pub fn throttle_per_rule(&self) -> Duration {
        Duration::from_secs(self.throttle_per_rule_secs)
    }
}

/// Settings for the web dashboard
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl DashboardConfig {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Full Sentinel configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub monitors: MonitorsConfig,
    pub ollama: OllamaConfig,
    pub alerts: AlertsConfig,
    pub dashboard: DashboardConfig,
    pub rules_path: PathBuf,
    pub watched_paths: Vec<PathBuf>,
    pub trusted_processes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            monitors: MonitorsConfig::default(),
            ollama: OllamaConfig::default(),
            alerts: AlertsConfig::default(),
            dashboard: DashboardConfig::default(),
            rules_path: PathBuf::from("rules/default_rules.yaml"),
            watched_paths: vec![
                PathBuf::from(r"C:\Windows\System32\drivers\etc\hosts"),
                PathBuf::from(r"C:\Windows\System32\drivers\etc\networks"),
            ],
            trusted_processes: [
                "svchost.exe",
                "System",
                "explorer.exe",
                "csrss.exe",
                "lsass.exe",
                "services.exe",
                "wininit.exe",
                "winlogon.exe",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Raw YAML shape before per-monitor defaults are resolved
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    monitors: BTreeMap<String, RawMonitor>,
    ollama: OllamaConfig,
    alerts: AlertsConfig,
    dashboard: DashboardConfig,
    rules_path: Option<PathBuf>,
    watched_paths: Option<Vec<PathBuf>>,
    trusted_processes: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMonitor {
    enabled: Option<bool>,
    interval: Option<u64>,
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// A missing file is not an error: every setting has a default.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let raw: RawConfig =
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            })?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawConfig) -> Self {
        let mut config = Self {
            ollama: raw.ollama,
            alerts: raw.alerts,
            dashboard: raw.dashboard,
            ..Self::default()
        };

        if let Some(rules_path) = raw.rules_path {
            config.rules_path = rules_path;
        }
        if let Some(watched_paths) = raw.watched_paths {
            config.watched_paths = watched_paths;
        }
        if let Some(trusted) = raw.trusted_processes {
            config.trusted_processes = trusted;
        }

        for (name, overrides) in &raw.monitors {
            let slot = match name.as_str() {
                "network" => &mut config.monitors.network,
                "portscan" => &mut config.monitors.portscan,
                "eventlog" => &mut config.monitors.eventlog,
                "process" => &mut config.monitors.process,
                "filesystem" => &mut config.monitors.filesystem,
                // Unknown monitor names are ignored so old configs keep loading
                _ => continue,
            };
            if let Some(enabled) = overrides.enabled {
                slot.enabled = enabled;
            }
            if let Some(interval) = overrides.interval {
                slot.interval_secs = interval;
            }
        }

        config
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
