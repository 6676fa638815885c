//! API error mapping

use alerting::AlertingError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use storage::StorageError;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by request handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("alerting error: {0}")]
    Alerting(#[from] AlertingError),
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            ApiError::Storage(e) => {
                error!("request failed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
            ApiError::Alerting(e) => {
                error!("request failed: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
