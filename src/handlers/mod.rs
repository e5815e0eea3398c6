pub mod analyze;
pub mod overlay;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::resolution::SubmissionTracker;
use crate::vision::VisionClient;

pub struct AppState {
    pub config: Config,
    pub vision: VisionClient,
    pub tracker: SubmissionTracker,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, crate::error::AppError> {
        let vision = VisionClient::new(&config)?;
        let tracker = SubmissionTracker::new(
            config.session_capacity,
            Duration::from_secs(config.session_ttl_secs),
        );
        Ok(Self {
            config,
            vision,
            tracker,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/health", get(health))
        .route("/analyze/:category", post(analyze::analyze))
        .route("/overlay", post(overlay::recompute_overlay))
        .route("/sessions/:session", get(overlay::session_status))
        .route("/sessions/:session/envelope", get(overlay::committed_envelope))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
