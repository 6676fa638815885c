//! Telemetry ingestion routes

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ApiError, AppState};
use storage::Sample;

/// One location report from a traveler client
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub traveler_id: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub success: bool,
}

/// Append a location report to the log
pub async fn report(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    state
        .repository
        .insert_sample(&request.traveler_id, request.latitude, request.longitude)
        .await?;
    Ok(Json(ReportResponse { success: true }))
}

/// Query parameters for the telemetry listing
#[derive(Debug, Deserialize)]
pub struct TelemetryQuery {
    /// Maximum number of records to return
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    500
}

/// Recent samples across all travelers (console map view)
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TelemetryQuery>,
) -> Result<Json<Vec<Sample>>, ApiError> {
    let limit = params.limit.clamp(1, 5000);
    Ok(Json(state.repository.list_samples(limit).await?))
}
