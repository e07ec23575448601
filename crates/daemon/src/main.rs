// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sentinel daemon (sentineld)
//!
//! Foreground process that runs the monitors, the rule engine, the alert
//! pipeline and the dashboard. First signal shuts down gracefully
//! (dashboard clients, then monitors); a second signal forces exit.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod banner;
mod lifecycle;

use clap::Parser;
use lifecycle::Startup;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(
    name = "sentineld",
    version,
    about = "Sentinel host-local intrusion detection daemon"
)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.verbose);

    let startup = match lifecycle::startup(&args.config).await {
        Ok(startup) => startup,
        Err(error) => {
            eprintln!("error initializing sentinel: {error}");
            return ExitCode::from(1);
        }
    };

    banner::print(&startup.info);
    run(startup).await;

    info!("sentinel stopped");
    ExitCode::SUCCESS
}

/// Everything to stderr so the banner on stdout stays clean.
fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_filter = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(startup: Startup) {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    spawn_signal_handler(shutdown_tx);

    let mut tasks = JoinSet::new();

    if let Some(feed_rx) = startup.feed_rx {
        let dashboard = startup.dashboard.clone();
        let handle = startup.handle.clone();
        let dashboard_shutdown = shutdown_rx.clone();
        tasks.spawn(async move {
            if let Err(err) =
                sentinel_dashboard::serve(dashboard, handle, feed_rx, dashboard_shutdown).await
            {
                error!(error = %err, "dashboard failed");
            }
        });
    }

    tasks.spawn(startup.engine.run(shutdown_rx));

    while tasks.join_next().await.is_some() {}
}

#[cfg(unix)]
fn spawn_signal_handler(shutdown: watch::Sender<bool>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(stream) => stream,
            Err(_) => return,
        };
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(stream) => stream,
            Err(_) => return,
        };

        let mut received = 0u32;
        loop {
            tokio::select! {
                _ = sigterm.recv() => {}
                _ = sigint.recv() => {}
            }
            received += 1;
            if received == 1 {
                info!("shutdown requested");
                let _ = shutdown.send(true);
            } else {
                warn!("second signal, forcing exit");
                std::process::exit(1);
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_signal_handler(shutdown: watch::Sender<bool>) {
    tokio::spawn(async move {
        let mut received = 0u32;
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            received += 1;
            if received == 1 {
                info!("shutdown requested");
                let _ = shutdown.send(true);
            } else {
                warn!("second signal, forcing exit");
                std::process::exit(1);
            }
        }
    });
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
