//! Dashboard API route handlers.
//!
//! Every handler locks the shared session for the duration of its read or
//! mutation, so requests are serialised with the cycle timer.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::BetOverrides;
use crate::engine::ledger::DISPLAY_LIMIT;
use crate::engine::session::{self, CycleReport, SessionStatus, SharedSession};
use crate::engine::timer::SharedTimer;
use crate::strategy::autobet::BettingSnapshot;
use crate::types::{BacBoError, PredictionSignal, Round};
use crate::vision::color::ColorReading;
use crate::vision::ImageDecoder;

/// Shared state for all dashboard routes.
#[derive(Clone)]
pub struct AppState {
    pub session: SharedSession,
    pub timer: SharedTimer,
    pub decoder: Arc<dyn ImageDecoder>,
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SeedRequest {
    pub seed: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedResponse {
    pub seed: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct IntervalRequest {
    /// Seconds between cycles; values below one are raised to one.
    pub interval: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimerStatus {
    pub running: bool,
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<SessionStatus> {
    Json(state.session.lock().await.status())
}

/// GET /api/history?limit=N
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<Round>> {
    let limit = query.limit.unwrap_or(DISPLAY_LIMIT);
    Json(state.session.lock().await.ledger().snapshot(limit))
}

/// GET /api/signal
pub async fn get_signal(State(state): State<AppState>) -> Json<Option<PredictionSignal>> {
    Json(state.session.lock().await.last_signal().cloned())
}

/// GET /api/export
pub async fn get_export(State(state): State<AppState>) -> impl IntoResponse {
    let text = state.session.lock().await.export_text();
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"bacbo_log.txt\"",
            ),
        ],
        text,
    )
}

/// POST /api/step
pub async fn post_step(State(state): State<AppState>) -> Json<CycleReport> {
    Json(state.session.lock().await.run_cycle())
}

/// POST /api/clear
pub async fn post_clear(State(state): State<AppState>) -> StatusCode {
    state.session.lock().await.clear();
    StatusCode::NO_CONTENT
}

/// POST /api/import (raw image bytes)
pub async fn post_import(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ColorReading>, (StatusCode, Json<ErrorBody>)> {
    session::import_image(&state.session, state.decoder.as_ref(), &body)
        .await
        .map(Json)
        .map_err(|e| {
            let status = match &e {
                BacBoError::ImageDecode(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                BacBoError::UndeterminedColor { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                BacBoError::UnknownOutcome(_) => StatusCode::BAD_REQUEST,
            };
            (status, Json(ErrorBody { error: e.to_string() }))
        })
}

/// POST /api/autobet/start
pub async fn post_autobet_start(
    State(state): State<AppState>,
    Json(call): Json<BetOverrides>,
) -> Json<BettingSnapshot> {
    let mut session = state.session.lock().await;
    session.start_auto_bet(call);
    Json(session.autobet().snapshot())
}

/// POST /api/autobet/stop
pub async fn post_autobet_stop(State(state): State<AppState>) -> Json<BettingSnapshot> {
    let mut session = state.session.lock().await;
    session.stop_auto_bet();
    Json(session.autobet().snapshot())
}

/// POST /api/overrides
pub async fn post_overrides(
    State(state): State<AppState>,
    Json(overrides): Json<BetOverrides>,
) -> Json<BettingSnapshot> {
    let mut session = state.session.lock().await;
    session.set_overrides(overrides);
    Json(session.autobet().snapshot())
}

/// POST /api/seed
pub async fn post_seed(
    State(state): State<AppState>,
    Json(req): Json<SeedRequest>,
) -> Json<SeedResponse> {
    let seed = state.session.lock().await.set_seed(req.seed.as_deref());
    Json(SeedResponse { seed })
}

/// GET /api/timer
pub async fn get_timer(State(state): State<AppState>) -> Json<TimerStatus> {
    let timer = state.timer.lock().await;
    Json(timer_status(timer.is_running(), timer.interval()))
}

/// POST /api/timer/start
pub async fn post_timer_start(State(state): State<AppState>) -> Json<TimerStatus> {
    let mut timer = state.timer.lock().await;
    timer.start();
    Json(timer_status(timer.is_running(), timer.interval()))
}

/// POST /api/timer/stop
pub async fn post_timer_stop(State(state): State<AppState>) -> Json<TimerStatus> {
    let mut timer = state.timer.lock().await;
    timer.stop();
    Json(timer_status(timer.is_running(), timer.interval()))
}

/// POST /api/timer/interval
pub async fn post_timer_interval(
    State(state): State<AppState>,
    Json(req): Json<IntervalRequest>,
) -> Json<TimerStatus> {
    let mut timer = state.timer.lock().await;
    timer.set_interval(Duration::from_secs(req.interval.max(1)));
    Json(timer_status(timer.is_running(), timer.interval()))
}

fn timer_status(running: bool, interval: Duration) -> TimerStatus {
    TimerStatus {
        running,
        interval_secs: interval.as_secs(),
    }
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
