//! Participant endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::store::{Participant, UpdateParticipant};
use crate::AppState;

use super::{paginate, validate_name};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/participants", post(create_participant))
        .route(
            "/participants/{id}",
            get(get_participant)
                .patch(update_participant)
                .delete(delete_participant),
        )
        .route("/groups/{id}/participants", get(list_group_participants))
}

#[derive(Debug, Deserialize)]
pub struct OptionalPageQuery {
    pub page: Option<u32>,
}

// ---------------------------------------------------------------------------
// POST /api/v1/participants
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateParticipantRequest {
    pub name: String,
    /// Id of the group this participant is nominated under.
    pub group: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/participants",
    request_body = CreateParticipantRequest,
    responses(
        (status = 201, description = "Participant created", body = Participant),
        (status = 404, description = "Group not found", body = crate::error::ApiErrorBody),
    ),
    tag = "Participants"
)]
pub async fn create_participant(
    State(state): State<AppState>,
    Json(body): Json<CreateParticipantRequest>,
) -> Result<(StatusCode, Json<Participant>), ApiError> {
    let name = validate_name(&body.name)?;

    state
        .store
        .group(&body.group)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    let participant = state.store.insert_participant(&name, &body.group).await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

// ---------------------------------------------------------------------------
// GET /api/v1/participants/:id
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/participants/{id}",
    params(("id" = String, Path, description = "Participant id")),
    responses(
        (status = 200, description = "The participant", body = Participant),
        (status = 404, description = "Participant not found", body = crate::error::ApiErrorBody),
    ),
    tag = "Participants"
)]
pub async fn get_participant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Participant>, ApiError> {
    let participant = state
        .store
        .participant(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Participant not found"))?;
    Ok(Json(participant))
}

// ---------------------------------------------------------------------------
// GET /api/v1/groups/:id/participants
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}/participants",
    params(
        ("id" = String, Path, description = "Group id"),
        ("page" = Option<u32>, Query, description = "Zero-based page of 10; omit for the full list"),
    ),
    responses(
        (status = 200, description = "Participants of the group, name ascending", body = [Participant]),
        (status = 404, description = "Group not found", body = crate::error::ApiErrorBody),
    ),
    tag = "Participants"
)]
pub async fn list_group_participants(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<OptionalPageQuery>,
) -> Result<Json<Vec<Participant>>, ApiError> {
    state
        .store
        .group(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    let mut participants = state.store.participants_by_group(&id).await?;
    participants.sort_by(|a, b| a.name.cmp(&b.name));

    let participants = match query.page {
        Some(page) => paginate(participants, page),
        None => participants,
    };
    Ok(Json(participants))
}

// ---------------------------------------------------------------------------
// PATCH /api/v1/participants/:id
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateParticipantRequest {
    /// Only the name can change; group membership is fixed at creation.
    pub name: Option<String>,
}

#[utoipa::path(
    patch,
    path = "/api/v1/participants/{id}",
    params(("id" = String, Path, description = "Participant id")),
    request_body = UpdateParticipantRequest,
    responses(
        (status = 200, description = "Updated participant", body = Participant),
        (status = 404, description = "Participant not found", body = crate::error::ApiErrorBody),
    ),
    tag = "Participants"
)]
pub async fn update_participant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateParticipantRequest>,
) -> Result<Json<Participant>, ApiError> {
    let name = match &body.name {
        Some(name) => Some(validate_name(name)?),
        None => None,
    };

    let updated = state
        .store
        .update_participant(&id, UpdateParticipant { name })
        .await?
        .ok_or_else(|| ApiError::not_found("Participant not found"))?;

    Ok(Json(updated))
}

// ---------------------------------------------------------------------------
// DELETE /api/v1/participants/:id
// ---------------------------------------------------------------------------

#[utoipa::path(
    delete,
    path = "/api/v1/participants/{id}",
    params(("id" = String, Path, description = "Participant id")),
    responses(
        (status = 204, description = "Participant deleted"),
        (status = 404, description = "Participant not found", body = crate::error::ApiErrorBody),
    ),
    tag = "Participants"
)]
pub async fn delete_participant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.store.delete_participant(&id).await? {
        return Err(ApiError::not_found("Participant not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
