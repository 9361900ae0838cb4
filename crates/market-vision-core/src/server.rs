//! HTTP surface of the relay.
//!
//! `POST /api/analyze` takes `{"image", "apiKey"}` and answers with a
//! [`RelayEnvelope`]; `GET /health` reports liveness.

use crate::config::Config;
use crate::error::RelayError;
use crate::llm::GeminiClient;
use crate::relay::{Relay, RelayEnvelope, RelayRequest};
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state for relay handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(RelayEnvelope::failure(self.to_string()))).into_response()
    }
}

/// Build the relay router.
pub fn router(relay: Relay, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { relay })
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Result<Json<RelayEnvelope>, RelayError> {
    let Json(request) = payload.map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RelayError::TooLarge
        } else {
            RelayError::InvalidBody(e.body_text())
        }
    })?;

    match state.relay.analyze(request).await {
        Ok(analysis) => Ok(Json(RelayEnvelope::success(analysis))),
        Err(e) => {
            if e.status_code() >= 500 {
                tracing::error!("Analysis failed: {e}");
            } else {
                tracing::warn!("Analysis rejected: {e}");
            }
            Err(e)
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "provider": state.relay.provider(),
    }))
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: &Config) -> std::io::Result<()> {
    let relay = Relay::new(Arc::new(GeminiClient::from_config(&config.gemini)));
    let app = router(relay, config.server.body_limit_bytes());

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        "Relay listening on http://{} (model: {})",
        listener.local_addr()?,
        config.gemini.model
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down relay");
}
