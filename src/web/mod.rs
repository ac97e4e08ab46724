use std::{
    convert::Infallible,
    net::SocketAddr,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::{net::TcpListener, sync::broadcast};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::{
    events::GameEvent,
    scenario::Scenario,
    session::{Session, SessionSettings},
    snapshot::GameSnapshot,
};

#[derive(Clone, Serialize)]
pub struct StateEnvelope {
    pub scenario: String,
    pub total_rounds: u64,
    pub snapshot: Option<GameSnapshot>,
    pub completed: bool,
}

#[derive(Clone)]
struct AppState {
    events: broadcast::Sender<GameEvent>,
    latest: Arc<Mutex<Option<GameSnapshot>>>,
    history: Arc<Mutex<Vec<GameSnapshot>>>,
    total_rounds: u64,
    scenario_name: String,
    finished: Arc<AtomicBool>,
}

pub struct WebServerConfig {
    pub scenario: Scenario,
    pub rounds: u64,
    pub snapshot_interval: u64,
    pub snapshot_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

/// Plays the scenario on a blocking task and serves its progress: the latest
/// snapshot, every snapshot so far, and a live stream of game events.
pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        scenario,
        rounds,
        snapshot_interval,
        snapshot_dir,
        host,
        port,
    } = config;

    let scenario_name = scenario.name.clone();
    let mut state = scenario.build_state()?;
    let events = state.events().sender();
    let mut session = Session::new(SessionSettings {
        scenario_name: scenario_name.clone(),
        seed: scenario.seed,
        snapshot_interval_rounds: snapshot_interval,
        snapshot_dir,
    });

    let latest: Arc<Mutex<Option<GameSnapshot>>> = Arc::new(Mutex::new(None));
    let history: Arc<Mutex<Vec<GameSnapshot>>> = Arc::new(Mutex::new(Vec::new()));
    let finished = Arc::new(AtomicBool::new(false));

    let latest_for_game = latest.clone();
    let history_for_game = history.clone();
    let finished_for_game = finished.clone();

    let game = tokio::task::spawn_blocking(move || -> Result<()> {
        session.run_with_hook(&mut state, rounds, |snapshot, _| {
            *latest_for_game.lock().expect("latest snapshot lock poisoned") =
                Some(snapshot.clone());
            history_for_game
                .lock()
                .expect("snapshot history lock poisoned")
                .push(snapshot.clone());
        })?;
        finished_for_game.store(true, Ordering::SeqCst);
        Ok(())
    });

    let label = scenario_name.clone();
    tokio::spawn(async move {
        match game.await {
            Ok(Ok(())) => tracing::info!(scenario = %label, "game completed"),
            Ok(Err(err)) => tracing::error!(scenario = %label, "game failed: {err:?}"),
            Err(err) => tracing::error!(scenario = %label, "game task panicked: {err:?}"),
        }
    });

    let app = Arc::new(AppState {
        events,
        latest,
        history,
        total_rounds: rounds,
        scenario_name,
        finished,
    });

    let router = Router::new()
        .route("/api/state", get(latest_state))
        .route("/api/snapshots", get(all_snapshots))
        .route("/api/events", get(stream_events))
        .with_state(app);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;
    tracing::info!(%addr, "serving game state");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutting down");
}

async fn latest_state(State(app): State<Arc<AppState>>) -> Json<StateEnvelope> {
    let snapshot = app
        .latest
        .lock()
        .expect("latest snapshot lock poisoned")
        .clone();
    Json(StateEnvelope {
        scenario: app.scenario_name.clone(),
        total_rounds: app.total_rounds,
        snapshot,
        completed: app.finished.load(Ordering::SeqCst),
    })
}

#[derive(Serialize)]
struct SnapshotsResponse {
    scenario: String,
    total_rounds: u64,
    completed: bool,
    snapshots: Vec<GameSnapshot>,
}

async fn all_snapshots(State(app): State<Arc<AppState>>) -> Json<SnapshotsResponse> {
    let snapshots = app
        .history
        .lock()
        .expect("snapshot history lock poisoned")
        .clone();
    Json(SnapshotsResponse {
        scenario: app.scenario_name.clone(),
        total_rounds: app.total_rounds,
        completed: app.finished.load(Ordering::SeqCst),
        snapshots,
    })
}

/// Lagged receivers skip the events they missed.
async fn stream_events(
    State(app): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(app.events.subscribe())
        .filter_map(|event| event.ok())
        .filter_map(|event| serde_json::to_string(&event).ok())
        .map(|payload| Ok(Event::default().data(payload)));
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
