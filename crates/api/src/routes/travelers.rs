//! Traveler registry routes

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ident, ApiError, AppState};
use storage::{NewTraveler, Sample, Traveler};

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub traveler_id: String,
}

/// Register a traveler and hand out their id
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let traveler_id = ident::traveler_id();
    state
        .repository
        .insert_traveler(&NewTraveler {
            traveler_id: traveler_id.clone(),
            name: request.name,
            email: request.email,
            phone: request.phone,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            traveler_id,
        }),
    ))
}

/// List registered travelers (console view)
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Traveler>>, ApiError> {
    Ok(Json(state.repository.list_travelers().await?))
}

/// Traveler details with their latest known position
#[derive(Debug, Serialize)]
pub struct TravelerDetails {
    #[serde(flatten)]
    pub traveler: Traveler,
    pub latest_location: Option<Sample>,
}

/// Look up one traveler
pub async fn details(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TravelerDetails>, ApiError> {
    let traveler = state
        .repository
        .find_traveler(&id)
        .await?
        .ok_or(ApiError::NotFound("traveler"))?;
    let latest_location = state.repository.latest_sample(&id).await?;

    Ok(Json(TravelerDetails {
        traveler,
        latest_location,
    }))
}
