/// Overlay recomputation and committed-envelope lookup per session.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::AppError;
use crate::geometry::{build_overlay, ContainerSize, Overlay};
use crate::resolution::ResultEnvelope;

#[derive(Deserialize)]
pub struct OverlayRequest {
    pub session: String,
    pub container_width: f64,
    pub container_height: f64,
}

#[derive(Serialize)]
pub struct OverlayResponse {
    pub session: String,
    pub submission: u64,
    pub overlay: Overlay,
}

#[derive(Serialize)]
pub struct SessionStatus {
    pub session: String,
    pub in_flight: bool,
    pub committed_submission: Option<u64>,
}

/// POST /overlay - Re-project the committed envelope for a new container size
pub async fn recompute_overlay(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OverlayRequest>,
) -> Result<Json<OverlayResponse>, AppError> {
    let envelope = committed(&state, &request.session).await?;
    let container = ContainerSize::new(request.container_width, request.container_height);
    let overlay = build_overlay(&envelope.primary, envelope.natural, container);

    tracing::debug!(
        session = %request.session,
        width = container.width,
        height = container.height,
        items = overlay.items().len(),
        "overlay recomputed"
    );

    Ok(Json(OverlayResponse {
        session: request.session,
        submission: envelope.submission,
        overlay,
    }))
}

/// GET /sessions/:session/envelope
pub async fn committed_envelope(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Result<Json<Arc<ResultEnvelope>>, AppError> {
    committed(&state, &session).await.map(Json)
}

/// GET /sessions/:session
pub async fn session_status(
    State(state): State<Arc<AppState>>,
    Path(session): Path<String>,
) -> Json<SessionStatus> {
    let in_flight = state.tracker.in_flight(&session).await;
    let committed_submission = state.tracker.latest(&session).await.map(|e| e.submission);
    Json(SessionStatus {
        session,
        in_flight,
        committed_submission,
    })
}

async fn committed(state: &AppState, session: &str) -> Result<Arc<ResultEnvelope>, AppError> {
    state
        .tracker
        .latest(session)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No committed result for session {session}")))
}
