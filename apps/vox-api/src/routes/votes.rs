//! Vote persistence endpoint.
//!
//! Deliberately decoupled from the gateway's `send-vote` broadcast: this
//! endpoint persists without emitting, the gateway emits without persisting.
//! A client doing both may see either side fail independently.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::store::Vote;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/votes", post(create_vote))
}

// ---------------------------------------------------------------------------
// POST /api/v1/votes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateVoteRequest {
    /// Id of the participant the vote is cast for.
    pub participant: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/votes",
    request_body = CreateVoteRequest,
    responses(
        (status = 201, description = "Vote recorded", body = Vote),
        (status = 404, description = "Participant not found", body = crate::error::ApiErrorBody),
    ),
    tag = "Votes"
)]
pub async fn create_vote(
    State(state): State<AppState>,
    Json(body): Json<CreateVoteRequest>,
) -> Result<(StatusCode, Json<Vote>), ApiError> {
    state
        .store
        .participant(&body.participant)
        .await?
        .ok_or_else(|| ApiError::not_found("Participant not found"))?;

    let vote = state.store.insert_vote(&body.participant).await?;
    Ok((StatusCode::CREATED, Json(vote)))
}
