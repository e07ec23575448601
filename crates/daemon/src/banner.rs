// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup banner with per-component status.

use std::path::PathBuf;

const BANNER: &str = r#"
  ____  _____ _   _ _____ ___ _   _ _____ _
 / ___|| ____| \ | |_   _|_ _| \ | | ____| |
 \___ \|  _| |  \| | | |  | ||  \| |  _| | |
  ___) | |___| |\  | | |  | || |\  | |___| |___
 |____/|_____|_| \_| |_| |___|_| \_|_____|_____|
        Host-local Intrusion Detection System
"#;

/// Everything the banner reports about the assembled daemon
#[derive(Debug, Clone)]
pub struct BannerInfo {
    pub elevated: bool,
    pub rules_loaded: usize,
    pub log_file: PathBuf,
    /// (monitor name, "ON" | "OFF" | "DEGRADED")
    pub monitors: Vec<(&'static str, &'static str)>,
    pub toast_enabled: bool,
    pub ollama_model: String,
    pub ollama_url: String,
    pub dashboard_url: Option<String>,
}

pub fn status_icon(status: &str) -> &'static str {
    match status {
        "ON" => "[+]",
        "DEGRADED" => "[~]",
        "OFF" => "[-]",
        _ => "[?]",
    }
}

pub fn print(info: &BannerInfo) {
    println!("{BANNER}");
    println!("{}", "=".repeat(50));

    let privileges = if info.elevated { "elevated" } else { "regular user" };
    println!("  Privileges:  {privileges}");
    println!("  Rules:       {} loaded", info.rules_loaded);
    println!("  Journal:     {}", info.log_file.display());
    println!();

    println!("  Monitors:");
    for (name, status) in &info.monitors {
        println!("    {} {:<12} {}", status_icon(status), name, status);
    }
    println!();

    let toast = if info.toast_enabled { "ON" } else { "OFF" };
    println!("  Toast:       {toast}");
    println!("  Ollama:      {} @ {}", info.ollama_model, info.ollama_url);
    if let Some(url) = &info.dashboard_url {
        println!("  Dashboard:   {url}");
    }

    println!("{}", "=".repeat(50));
    println!("  Ctrl+C to stop");
    println!();
}

#[cfg(test)]
#[path = "banner_tests.rs"]
mod tests;
