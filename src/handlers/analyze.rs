/// Analysis endpoint: /analyze/:category

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;

use super::AppState;
use crate::error::AppError;
use crate::geometry::{build_overlay, ContainerSize, NaturalImageDimensions, Overlay};
use crate::preprocess::{decode_image, extract_all, read_dimensions, DetectionThumbnail};
use crate::resolution::{resolve, CommitOutcome, ResultEnvelope};
use crate::vision::Category;

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub session: String,
    pub submission: u64,
    /// False when a newer submission for the same session superseded this one.
    pub committed: bool,
    pub image: NaturalImageDimensions,
    pub envelope: Arc<ResultEnvelope>,
    pub overlay: Option<Overlay>,
    pub thumbnails: Vec<DetectionThumbnail>,
    pub total_time_ms: f64,
}

struct AnalyzeForm {
    file: Bytes,
    session: Option<String>,
    container: Option<ContainerSize>,
    thumbnails: bool,
}

/// POST /analyze/:category - Single image analysis
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Path(segment): Path<String>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let start = Instant::now();

    let category = Category::from_segment(&segment)
        .ok_or_else(|| AppError::NotFound(format!("Unknown category: {segment}")))?;

    let form = read_form(multipart).await?;
    let natural = read_dimensions(&form.file).map_err(AppError::ImageDecode)?;

    let session = form
        .session
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let ticket = state.tracker.begin(&session).await;

    // Full decode runs off the runtime while the detection chain is in flight.
    let file = form.file.clone();
    let decode = tokio::task::spawn_blocking(move || decode_image(&file));
    let (decoded, envelope) = tokio::join!(
        decode,
        resolve(&state.vision, &form.file, category, natural, ticket.sequence)
    );

    // A header that parses over a truncated body must not replace the
    // session's committed envelope.
    let decoded = match decoded
        .map_err(|e| AppError::Internal(format!("Decode task failed: {e}")))
        .and_then(|result| result.map_err(AppError::ImageDecode))
    {
        Ok(decoded) => decoded,
        Err(e) => {
            state.tracker.abandon(&ticket).await;
            return Err(e);
        }
    };

    let envelope = Arc::new(envelope);
    let committed = match state.tracker.commit(&ticket, envelope.clone()).await {
        CommitOutcome::Committed => true,
        CommitOutcome::Superseded { .. } => false,
    };

    let overlay = form
        .container
        .map(|container| build_overlay(&envelope.primary, natural, container));

    // Thumbnails only once both the bitmap and the final region set exist.
    let thumbnails = if form.thumbnails && envelope.primary.iter().any(|d| d.region.is_some()) {
        let (size, quality) = (state.config.thumbnail_size, state.config.thumbnail_quality);
        let detections = envelope.clone();
        tokio::task::spawn_blocking(move || {
            extract_all(&detections.primary, &decoded, size, quality)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Thumbnail task failed: {e}")))?
    } else {
        Vec::new()
    };

    Ok(Json(AnalyzeResponse {
        session,
        submission: ticket.sequence,
        committed,
        image: natural,
        envelope,
        overlay,
        thumbnails,
        total_time_ms: start.elapsed().as_secs_f64() * 1000.0,
    }))
}

async fn read_form(mut multipart: Multipart) -> Result<AnalyzeForm, AppError> {
    let mut file = None;
    let mut session = None;
    let mut width = None;
    let mut height = None;
    let mut thumbnails = true;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?;
                file = Some(data);
            }
            "session" | "container_width" | "container_height" | "thumbnails" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read {name}: {e}")))?;
                let text = text.trim().to_string();
                match name.as_str() {
                    "session" => session = Some(text).filter(|s| !s.is_empty()),
                    "container_width" => width = Some(parse_dimension(&name, &text)?),
                    "container_height" => height = Some(parse_dimension(&name, &text)?),
                    _ => thumbnails = !text.eq_ignore_ascii_case("false"),
                }
            }
            _ => {}
        }
    }

    let file = file
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::BadRequest("No file field in request".to_string()))?;

    let container = match (width, height) {
        (Some(w), Some(h)) => Some(ContainerSize::new(w, h)),
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "container_width and container_height must be sent together".to_string(),
            ))
        }
    };

    Ok(AnalyzeForm {
        file,
        session,
        container,
        thumbnails,
    })
}

fn parse_dimension(name: &str, value: &str) -> Result<f64, AppError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid {name}: {value}")))
}
