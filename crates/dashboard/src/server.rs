// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dashboard HTTP/WebSocket server.

use crate::protocol::{ClientMessage, ServerMessage, SnapshotData, StatsData};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::{Html, Response};
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use sentinel_core::{Alert, DashboardConfig, Event};
use sentinel_engine::{EngineHandle, Feed};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

const MAX_RECENT_EVENTS: usize = 100;
const MAX_RECENT_ALERTS: usize = 50;
const STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Per-client outgoing queue; a client this far behind is dropped
const CLIENT_QUEUE_CAPACITY: usize = 64;

static INDEX_HTML: &str = include_str!("static/index.html");

/// Errors from dashboard startup
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] io::Error),
}

/// Recent-history ring buffers; oldest entries drop on overflow.
#[derive(Default)]
struct Rings {
    events: VecDeque<Event>,
    alerts: VecDeque<Alert>,
}

impl Rings {
    fn push_event(&mut self, event: Event) {
        if self.events.len() == MAX_RECENT_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    fn push_alert(&mut self, alert: Alert) {
        if self.alerts.len() == MAX_RECENT_ALERTS {
            self.alerts.pop_front();
        }
        self.alerts.push_back(alert);
    }
}

#[derive(Clone)]
struct AppState {
    engine: EngineHandle,
    rings: Arc<Mutex<Rings>>,
    clients: Arc<Mutex<HashMap<u64, mpsc::Sender<String>>>>,
    next_client_id: Arc<AtomicU64>,
    shutdown: watch::Receiver<bool>,
}

impl AppState {
    fn new(engine: EngineHandle, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            engine,
            rings: Arc::new(Mutex::new(Rings::default())),
            clients: Arc::new(Mutex::new(HashMap::new())),
            next_client_id: Arc::new(AtomicU64::new(1)),
            shutdown,
        }
    }

    fn register_client(&self) -> (u64, mpsc::Receiver<String>) {
        let id = self.next_client_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CLIENT_QUEUE_CAPACITY);
        self.clients.lock().insert(id, tx);
        (id, rx)
    }

    fn drop_client(&self, id: u64) {
        self.clients.lock().remove(&id);
    }

    fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Send to every client; clients with a full or closed queue are
    /// dropped so slow consumers never backpressure the feed.
    fn broadcast(&self, message: &ServerMessage) {
        let payload = match serde_json::to_string(message) {
            Ok(payload) => payload,
            Err(_) => return,
        };

        let mut dead = Vec::new();
        {
            let clients = self.clients.lock();
            for (&id, tx) in clients.iter() {
                if tx.try_send(payload.clone()).is_err() {
                    dead.push(id);
                }
            }
        }
        for id in dead {
            info!(client = id, "dropping unresponsive dashboard client");
            self.drop_client(id);
        }
    }

    fn send_to(&self, id: u64, message: &ServerMessage) {
        let payload = match serde_json::to_string(message) {
            Ok(payload) => payload,
            Err(_) => return,
        };
        if let Some(tx) = self.clients.lock().get(&id) {
            let _ = tx.try_send(payload);
        }
    }

    fn snapshot_message(&self) -> ServerMessage {
        let rings = self.rings.lock();
        ServerMessage::Snapshot(SnapshotData {
            snapshot: self.engine.snapshot(),
            recent_alerts: rings.alerts.iter().cloned().collect(),
            recent_events: rings.events.iter().cloned().collect(),
        })
    }

    fn handle_feed(&self, item: Feed) {
        match item {
            Feed::Event(event) => {
                let from_network = event.source == "network";
                self.rings.lock().push_event(event.clone());
                self.broadcast(&ServerMessage::Event(event));

                if from_network {
                    if let Some(listeners) = self.engine.monitor_state("network") {
                        self.broadcast(&ServerMessage::ListenersUpdate(listeners));
                    }
                }
            }
            Feed::Alert(alert) => {
                self.rings.lock().push_alert(alert.clone());
                self.broadcast(&ServerMessage::Alert(alert));
            }
        }
    }

    fn broadcast_stats(&self) {
        if self.client_count() == 0 {
            return;
        }
        self.broadcast(&ServerMessage::Stats(StatsData {
            stats: self.engine.stats(),
            ws_clients: self.client_count(),
        }));
    }
}

/// Run the dashboard until shutdown.
///
/// Consumes the engine feed, pushes deltas to clients, and broadcasts
/// stats every five seconds. On shutdown the client channels close first,
/// then the listener stops accepting.
pub async fn serve(
    config: DashboardConfig,
    engine: EngineHandle,
    mut feed: mpsc::Receiver<Feed>,
    shutdown: watch::Receiver<bool>,
) -> Result<(), DashboardError> {
    let state = AppState::new(engine, shutdown.clone());

    let pump_state = state.clone();
    let mut pump_shutdown = shutdown.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                maybe_item = feed.recv() => match maybe_item {
                    Some(item) => pump_state.handle_feed(item),
                    None => break,
                },
                _ = pump_shutdown.changed() => break,
            }
        }
    });

    let stats_state = state.clone();
    let mut stats_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(STATS_INTERVAL);
        // the first tick fires immediately; skip it
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = ticker.tick() => stats_state.broadcast_stats(),
                _ = stats_shutdown.changed() => break,
            }
        }
    });

    let app = Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_handler))
        .with_state(state.clone());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| DashboardError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(%addr, "dashboard listening");

    let mut serve_shutdown = shutdown.clone();
    let close_state = state;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = serve_shutdown.changed().await;
            // close client channels first so socket tasks drain and exit
            close_state.clients.lock().clear();
        })
        .await?;

    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (client_id, mut outgoing) = state.register_client();
    info!(client = client_id, clients = state.client_count(), "dashboard client connected");

    // Snapshot goes out first; after that the pump owns the sink and
    // relays this client's queue.
    let snapshot = state.snapshot_message();
    tokio::spawn(async move {
        if let Ok(payload) = serde_json::to_string(&snapshot) {
            if sink.send(Message::Text(payload.into())).await.is_err() {
                return;
            }
        }
        while let Some(payload) = outgoing.recv().await {
            if sink.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    let mut shutdown = state.shutdown.clone();
    loop {
        let message = tokio::select! {
            maybe_message = stream.next() => match maybe_message {
                Some(message) => message,
                None => break,
            },
            _ = shutdown.changed() => break,
        };

        match message {
            Ok(Message::Text(text)) => {
                if let Ok(ClientMessage::Ping) = serde_json::from_str(text.as_str()) {
                    state.send_to(client_id, &ServerMessage::Pong);
                }
            }
            Ok(Message::Close(_)) => break,
            Err(error) => {
                debug!(client = client_id, %error, "websocket error");
                break;
            }
            _ => {}
        }
    }

    // removing the sender ends this client's relay task
    state.drop_client(client_id);
    info!(client = client_id, clients = state.client_count(), "dashboard client disconnected");
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
