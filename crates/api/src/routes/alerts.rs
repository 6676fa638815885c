//! Alert routes: panic dispatch, console and traveler feeds, resolution

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ApiError, AppState};
use alerting::PanicReceipt;
use storage::{Alert, CATEGORY_CONSOLE, CATEGORY_SUBJECT};

/// Panic button press
#[derive(Debug, Deserialize)]
pub struct PanicRequest {
    pub traveler_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Fan a panic press out to the console, the sender, and any group peers
pub async fn panic(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PanicRequest>,
) -> Result<Json<PanicReceipt>, ApiError> {
    let receipt = state
        .panic_router
        .dispatch(&request.traveler_id, request.latitude, request.longitude)
        .await?;
    Ok(Json(receipt))
}

/// Query parameters for the console feed
#[derive(Debug, Deserialize)]
pub struct ConsoleQuery {
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// Console feed entry, enriched with registry details
#[derive(Debug, Serialize)]
pub struct ConsoleAlert {
    #[serde(flatten)]
    pub alert: Alert,
    pub traveler_name: String,
    pub traveler_phone: String,
}

/// Unresolved console-category alerts, newest first
pub async fn console_feed(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ConsoleQuery>,
) -> Result<Json<Vec<ConsoleAlert>>, ApiError> {
    let alerts = state
        .repository
        .unresolved_by_category(CATEGORY_CONSOLE, params.limit.clamp(1, 500))
        .await?;

    let mut feed = Vec::with_capacity(alerts.len());
    for alert in alerts {
        let traveler = state.repository.find_traveler(&alert.traveler_id).await?;
        let (traveler_name, traveler_phone) = match traveler {
            Some(t) => (t.name, t.phone),
            None => ("Unknown".to_string(), "N/A".to_string()),
        };
        feed.push(ConsoleAlert {
            alert,
            traveler_name,
            traveler_phone,
        });
    }

    Ok(Json(feed))
}

/// Unresolved subject-category alerts for one traveler, newest first
pub async fn traveler_feed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Alert>>, ApiError> {
    let alerts = state
        .repository
        .unresolved_for_traveler(&id, CATEGORY_SUBJECT, 10)
        .await?;
    Ok(Json(alerts))
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub resolved: bool,
}

/// Resolve a console alert and the linked records of the same incident
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let resolved = state.linker.resolve(id).await?;
    Ok(Json(ResolveResponse { resolved }))
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: u64,
}

/// Administrative bulk clear of the alert store
pub async fn clear(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearResponse>, ApiError> {
    let cleared = state.repository.clear_alerts().await?;
    Ok(Json(ClearResponse { cleared }))
}
