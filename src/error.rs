/// Error types for the vision overlay service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("Vision API error: {0}")]
    VisionApi(String),
    #[error("Thumbnail error: {0}")]
    Thumbnail(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ImageDecode(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::VisionApi(_) => StatusCode::BAD_GATEWAY,
            AppError::Thumbnail(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(format!("IO error: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::ImageDecode(msg)
            | AppError::VisionApi(msg)
            | AppError::Thumbnail(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Internal(msg) => msg.clone(),
        };

        tracing::warn!(status = status.as_u16(), %message, "request failed");

        let body = json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_http_status() {
        assert_eq!(AppError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::ImageDecode("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::VisionApi("x".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            AppError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_carries_status_code() {
        let response = AppError::NotFound("no envelope".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn display_includes_context() {
        let err = AppError::VisionApi("quota exceeded".into());
        assert_eq!(err.to_string(), "Vision API error: quota exceeded");
    }
}
