//! Dashboard — Axum JSON API over the shared session.
//!
//! Serves session data for an external front-end; no HTML is rendered
//! here. CORS enabled for local development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

pub use routes::AppState;

/// Largest screenshot accepted by `/api/import`.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Bind the port and serve the API on a background task.
///
/// Returns the bound address once the listener is ready.
pub async fn spawn_dashboard(state: AppState, port: u16) -> Result<SocketAddr> {
    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard port {port}"))?;
    let local = listener.local_addr().context("Dashboard listener has no address")?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "Dashboard server error");
        }
    });

    info!(port = local.port(), "Dashboard server listening on http://localhost:{}", local.port());
    Ok(local)
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/status", get(routes::get_status))
        .route("/api/history", get(routes::get_history))
        .route("/api/signal", get(routes::get_signal))
        .route("/api/export", get(routes::get_export))
        .route("/api/step", post(routes::post_step))
        .route("/api/clear", post(routes::post_clear))
        .route("/api/autobet/start", post(routes::post_autobet_start))
        .route("/api/autobet/stop", post(routes::post_autobet_stop))
        .route("/api/overrides", post(routes::post_overrides))
        .route("/api/seed", post(routes::post_seed))
        .route(
            "/api/import",
            post(routes::post_import).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/timer", get(routes::get_timer))
        .route("/api/timer/start", post(routes::post_timer_start))
        .route("/api/timer/stop", post(routes::post_timer_stop))
        .route("/api/timer/interval", post(routes::post_timer_interval))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::engine::session::Session;
    use crate::engine::timer::CycleTimer;
    use crate::vision::decoder::{encode_png, RasterDecoder};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let session = Session::new(AppConfig {
            seed: Some("42".into()),
            ..AppConfig::default()
        })
        .into_shared();
        AppState {
            timer: CycleTimer::new(session.clone(), Duration::from_secs(6)).into_shared(),
            session,
            decoder: Arc::new(RasterDecoder),
        }
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(test_state());
        let resp = app.oneshot(get_req("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = build_router(test_state());
        let resp = app.oneshot(get_req("/api/status")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["seed"], 42);
        assert_eq!(json["betting"]["bankroll"].as_f64().unwrap(), 10000.0);
        assert_eq!(json["stats"]["rounds"], 0);
    }

    #[tokio::test]
    async fn test_step_then_history() {
        let state = test_state();
        let app = build_router(state.clone());

        let resp = app.clone().oneshot(post_json("/api/step", "")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let report: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(report["cycle_number"], 1);
        assert_eq!(report["casino"], "Player");

        let resp = app.oneshot(get_req("/api/history?limit=5")).await.unwrap();
        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let history: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_export_endpoint() {
        let state = test_state();
        state.session.lock().await.run_cycle();
        let app = build_router(state);

        let resp = app.oneshot(get_req("/api/export")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("1|C:P|M:"));
    }

    #[tokio::test]
    async fn test_clear_endpoint() {
        let state = test_state();
        state.session.lock().await.run_cycle();
        let app = build_router(state.clone());

        let resp = app.oneshot(post_json("/api/clear", "")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(state.session.lock().await.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_autobet_start_endpoint() {
        let state = test_state();
        let app = build_router(state.clone());

        let resp = app
            .oneshot(post_json("/api/autobet/start", r#"{"stake": 250, "stopLoss": 2}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let session = state.session.lock().await;
        let snap = session.autobet().snapshot();
        assert!(snap.active);
        assert_eq!(snap.stop_loss_streak, 2);
    }

    #[tokio::test]
    async fn test_seed_endpoint() {
        let state = test_state();
        let app = build_router(state.clone());
        let resp = app
            .oneshot(post_json("/api/seed", r#"{"seed": "100"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(state.session.lock().await.seed(), Some(100));
    }

    #[tokio::test]
    async fn test_import_endpoint() {
        let state = test_state();
        let app = build_router(state.clone());

        let req = Request::builder()
            .method("POST")
            .uri("/api/import")
            .header(header::CONTENT_TYPE, "image/png")
            .body(Body::from(encode_png(120, 90, [230, 30, 40])))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["outcome"], "Banker");
        assert_eq!(json["label"], "BANKER");

        let req = Request::builder()
            .method("POST")
            .uri("/api/import")
            .body(Body::from("plain text"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let session = state.session.lock().await;
        assert_eq!(session.ledger().counts().banker, 1);
        assert_eq!(session.ledger().len(), 2);
    }

    #[tokio::test]
    async fn test_import_undetermined_colour() {
        let app = build_router(test_state());
        let req = Request::builder()
            .method("POST")
            .uri("/api/import")
            .body(Body::from(encode_png(60, 60, [0, 200, 0])))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("Indef"));
    }

    #[tokio::test]
    async fn test_timer_endpoints() {
        let state = test_state();
        let app = build_router(state.clone());

        let resp = app.clone().oneshot(get_req("/api/timer")).await.unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["running"], false);
        assert_eq!(json["interval_secs"], 6);

        let resp = app.clone().oneshot(post_json("/api/timer/start", "")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["running"], true);

        let resp = app
            .clone()
            .oneshot(post_json("/api/timer/interval", r#"{"interval": 2}"#))
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["running"], true);
        assert_eq!(json["interval_secs"], 2);

        let resp = app.oneshot(post_json("/api/timer/stop", "")).await.unwrap();
        assert_eq!(body_json(resp).await["running"], false);
        assert!(!state.timer.lock().await.is_running());
    }
}
