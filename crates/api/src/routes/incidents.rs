//! Incident case filing routes

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ident, ApiError, AppState};
use storage::{Incident, NewIncident};

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub traveler_id: String,
    pub incident_type: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub success: bool,
    pub case_number: String,
}

/// File an incident case, assigning a case number
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRequest>,
) -> Result<(StatusCode, Json<CreateResponse>), ApiError> {
    let case_number = ident::case_number();
    state
        .repository
        .insert_incident(&NewIncident {
            traveler_id: request.traveler_id,
            incident_type: request.incident_type,
            description: request.description,
            case_number: case_number.clone(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            success: true,
            case_number,
        }),
    ))
}

/// All filed incidents, newest first
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Incident>>, ApiError> {
    Ok(Json(state.repository.list_incidents().await?))
}
