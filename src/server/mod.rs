//! HTTP API.
//!
//! A thin axum shell over `lookup`: handlers parse parameters, call into the
//! core, and map `AqiError` onto status codes.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::config::HistoryConfig;
use crate::history::HistoryStore;
use crate::ingest::waqi::WaqiClient;
use crate::model::AqiError;

pub mod routes;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<HistoryStore>,
    pub provider: Arc<WaqiClient>,
    pub history: HistoryConfig,
}

impl AppState {
    pub fn new(provider: WaqiClient, history: HistoryConfig) -> Self {
        Self {
            store: Arc::new(HistoryStore::new(history.capacity)),
            provider: Arc::new(provider),
            history,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/aqi", get(routes::aqi))
        .route("/api/history", get(routes::history))
        .route("/api/levels", get(routes::levels))
        .route("/api/classify", get(routes::classify))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error responses
// ---------------------------------------------------------------------------

pub fn status_for(err: &AqiError) -> StatusCode {
    match err {
        AqiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        AqiError::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for AqiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (status_for(&self), body).into_response()
    }
}
