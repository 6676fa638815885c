//! Group management routes

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ident, ApiError, AppState};
use chrono::{DateTime, Utc};
use storage::{CreateGroup, JoinGroup};

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    pub traveler_id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Create a group with the caller as first member
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRequest>,
) -> Result<Json<CreateResponse>, ApiError> {
    let code = ident::group_code();
    let outcome = state
        .repository
        .create_group(&request.name, &request.traveler_id, &code)
        .await?;

    let response = match outcome {
        CreateGroup::Created { code } => CreateResponse {
            success: true,
            group_code: Some(code),
            message: None,
        },
        CreateGroup::AlreadyMember => CreateResponse {
            success: false,
            group_code: None,
            message: Some("You must leave your current group first".to_string()),
        },
    };
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub traveler_id: String,
    pub group_code: String,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Join a group by invite code
pub async fn join(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, ApiError> {
    let outcome = state
        .repository
        .join_group(&request.traveler_id, &request.group_code)
        .await?;

    let response = match outcome {
        JoinGroup::Joined { group_name } => JoinResponse {
            success: true,
            group_name: Some(group_name),
            message: None,
        },
        JoinGroup::AlreadyMember => JoinResponse {
            success: false,
            group_name: None,
            message: Some("You must leave your current group first".to_string()),
        },
        JoinGroup::UnknownCode => JoinResponse {
            success: false,
            group_name: None,
            message: Some("Invalid group code".to_string()),
        },
    };
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct LeaveRequest {
    pub traveler_id: String,
}

#[derive(Debug, Serialize)]
pub struct LeaveResponse {
    pub success: bool,
}

/// Leave the current group
pub async fn leave(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LeaveRequest>,
) -> Result<Json<LeaveResponse>, ApiError> {
    let success = state.repository.leave_group(&request.traveler_id).await?;
    Ok(Json(LeaveResponse { success }))
}

#[derive(Debug, Serialize)]
pub struct GroupMemberView {
    pub traveler_id: String,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MyGroupResponse {
    pub has_group: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_code: Option<String>,
    pub members: Vec<GroupMemberView>,
}

/// The caller's group and its roster
pub async fn mine(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MyGroupResponse>, ApiError> {
    let Some(membership) = state.repository.membership_of(&id).await? else {
        return Ok(Json(MyGroupResponse {
            has_group: false,
            group_name: None,
            group_code: None,
            members: Vec::new(),
        }));
    };

    let group = state
        .repository
        .find_group(membership.group_id)
        .await?
        .ok_or(ApiError::NotFound("group"))?;

    let mut members = Vec::new();
    for member in state.repository.group_members(group.id).await? {
        let name = state
            .repository
            .find_traveler(&member.traveler_id)
            .await?
            .map(|t| t.name)
            .unwrap_or_else(|| member.traveler_id.clone());
        members.push(GroupMemberView {
            traveler_id: member.traveler_id,
            name,
            joined_at: member.joined_at,
        });
    }

    Ok(Json(MyGroupResponse {
        has_group: true,
        group_name: Some(group.name),
        group_code: Some(group.code),
        members,
    }))
}

#[derive(Debug, Serialize)]
pub struct MemberLocation {
    pub traveler_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Latest known position of every member of the caller's group
pub async fn locations(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MemberLocation>>, ApiError> {
    let Some(membership) = state.repository.membership_of(&id).await? else {
        return Ok(Json(Vec::new()));
    };

    let mut locations = Vec::new();
    for member in state.repository.group_members(membership.group_id).await? {
        let traveler = state.repository.find_traveler(&member.traveler_id).await?;
        let sample = state.repository.latest_sample(&member.traveler_id).await?;
        if let (Some(traveler), Some(sample)) = (traveler, sample) {
            locations.push(MemberLocation {
                traveler_id: member.traveler_id,
                name: traveler.name,
                latitude: sample.latitude,
                longitude: sample.longitude,
                recorded_at: sample.recorded_at,
            });
        }
    }

    Ok(Json(locations))
}
