// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The engine loop: monitors → rule catalog → pipeline → dashboard feed.

use crate::pipeline::AlertPipeline;
use sentinel_adapters::NotifyAdapter;
use sentinel_core::{Alert, Clock, Event};
use sentinel_intel::Enrich;
use sentinel_monitors::{run_monitor, Monitor, MonitorPanel, StatusBoard};
use sentinel_rules::Catalog;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Capacity of the monitor → engine event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Deltas pushed to the dashboard.
///
/// The feed channel is bounded and sends never block: when the dashboard
/// falls behind, deltas are dropped rather than stalling detection.
#[derive(Debug, Clone)]
pub enum Feed {
    Event(Event),
    Alert(Alert),
}

#[derive(Default)]
struct Counters {
    events_total: AtomicU64,
    alerts_total: AtomicU64,
}

/// Global counters for the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub events_total: u64,
    pub alerts_total: u64,
    pub uptime_seconds: u64,
}

/// Full state for a freshly connected dashboard client
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub monitors: BTreeMap<String, MonitorPanel>,
    pub stats: Stats,
}

/// Read-only view of the engine, cheap to clone.
///
/// This is the only surface the dashboard sees; the engine never imports
/// dashboard types.
#[derive(Clone)]
pub struct EngineHandle {
    counters: Arc<Counters>,
    board: StatusBoard,
    started_at: Instant,
}

impl EngineHandle {
    pub fn stats(&self) -> Stats {
        Stats {
            events_total: self.counters.events_total.load(Ordering::Relaxed),
            alerts_total: self.counters.alerts_total.load(Ordering::Relaxed),
            uptime_seconds: self.started_at.elapsed().as_secs(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            monitors: self.board.snapshot(),
            stats: self.stats(),
        }
    }

    /// Current state of one monitor's panel, e.g. the listener table.
    pub fn monitor_state(&self, name: &str) -> Option<serde_json::Value> {
        self.board.panel_state(name)
    }
}

/// Orchestrates monitors, rule evaluation and the alert pipeline.
pub struct Engine<E, N, C> {
    catalog: Catalog,
    pipeline: AlertPipeline<E, N, C>,
    monitors: Vec<Box<dyn Monitor>>,
    board: StatusBoard,
    counters: Arc<Counters>,
    started_at: Instant,
    feed: Option<mpsc::Sender<Feed>>,
}

impl<E: Enrich, N: NotifyAdapter, C: Clock> Engine<E, N, C> {
    pub fn new(
        catalog: Catalog,
        pipeline: AlertPipeline<E, N, C>,
        monitors: Vec<Box<dyn Monitor>>,
        board: StatusBoard,
        feed: Option<mpsc::Sender<Feed>>,
    ) -> Self {
        Self {
            catalog,
            pipeline,
            monitors,
            board,
            counters: Arc::new(Counters::default()),
            started_at: Instant::now(),
            feed,
        }
    }

    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            counters: Arc::clone(&self.counters),
            board: self.board.clone(),
            started_at: self.started_at,
        }
    }

    /// Spawn the monitor tasks and process events until shutdown.
    ///
    /// Events from one monitor arrive in emission order; interleaving
    /// across monitors is whatever the channel delivers.
    pub async fn run(mut self, shutdown: watch::Receiver<bool>) {
        let (event_tx, mut event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let mut monitor_tasks = JoinSet::new();
        for monitor in self.monitors.drain(..) {
            monitor_tasks.spawn(run_monitor(
                monitor,
                self.board.clone(),
                event_tx.clone(),
                shutdown.clone(),
            ));
        }
        // the engine holds no sender; the channel closes when monitors end
        drop(event_tx);

        info!("engine loop started");
        let mut shutdown_rx = shutdown.clone();
        loop {
            tokio::select! {
                maybe_event = event_rx.recv() => match maybe_event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
                _ = shutdown_rx.changed() => break,
            }
        }

        // process whatever the monitors sent before stopping
        while let Ok(event) = event_rx.try_recv() {
            self.handle_event(event).await;
        }
        // a monitor mid-send must see a closed channel, not a full one
        drop(event_rx);

        while monitor_tasks.join_next().await.is_some() {}

        info!(
            events = self.counters.events_total.load(Ordering::Relaxed),
            alerts = self.counters.alerts_total.load(Ordering::Relaxed),
            "engine stopped"
        );
    }

    async fn handle_event(&mut self, event: Event) {
        self.counters.events_total.fetch_add(1, Ordering::Relaxed);
        debug!(
            source = %event.source,
            event_type = %event.event_type,
            id = %event.event_id,
            "event received"
        );
        self.push_feed(Feed::Event(event.clone()));

        for mut alert in self.catalog.evaluate(&event) {
            if self.pipeline.process(&mut alert).await {
                self.counters.alerts_total.fetch_add(1, Ordering::Relaxed);
                self.push_feed(Feed::Alert(alert));
            }
        }
    }

    fn push_feed(&self, item: Feed) {
        if let Some(feed) = &self.feed {
            let _ = feed.try_send(item);
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
