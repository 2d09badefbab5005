//! Group endpoints: CRUD, hierarchy views, and poll results.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::queries::hierarchy::{self, GroupView};
use crate::queries::tally::{self, TallyResult};
use crate::store::{Group, UpdateGroup};
use crate::AppState;

use super::{paginate, validate_name};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/groups", post(create_group))
        .route(
            "/groups/{id}",
            get(get_group).patch(update_group).delete(delete_group),
        )
        .route("/groups/{id}/children", get(list_child_groups))
        .route("/groups/{id}/result", get(get_result))
        .route("/users/{user}/groups", get(list_root_groups))
        .route("/users/{user}/groups/leaves", get(list_leaf_groups))
        .route(
            "/users/{user}/groups/without-participants",
            get(list_groups_without_participants),
        )
        .route(
            "/users/{user}/groups/with-participants",
            get(list_groups_with_participants),
        )
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: u32,
}

// ---------------------------------------------------------------------------
// POST /api/v1/groups
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    /// Id of the owning user.
    pub owner: String,
    /// Id of the parent group, for subgroups.
    pub parent: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = Group),
        (status = 404, description = "Owner or parent not found", body = crate::error::ApiErrorBody),
    ),
    tag = "Groups"
)]
pub async fn create_group(
    State(state): State<AppState>,
    Json(body): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    let name = validate_name(&body.name)?;

    state
        .store
        .user(&body.owner)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if let Some(parent) = &body.parent {
        state
            .store
            .group(parent)
            .await?
            .ok_or_else(|| ApiError::not_found("Parent group not found"))?;
    }

    let group = state
        .store
        .insert_group(&name, &body.owner, body.parent.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

// ---------------------------------------------------------------------------
// GET /api/v1/groups/:id
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "The group", body = Group),
        (status = 404, description = "Group not found", body = crate::error::ApiErrorBody),
    ),
    tag = "Groups"
)]
pub async fn get_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Group>, ApiError> {
    let group = state
        .store
        .group(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;
    Ok(Json(group))
}

// ---------------------------------------------------------------------------
// GET /api/v1/users/:user/groups
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/users/{user}/groups",
    params(
        ("user" = String, Path, description = "Owner id"),
        ("page" = Option<u32>, Query, description = "Zero-based page of 10"),
    ),
    responses(
        (status = 200, description = "Root groups owned by the user", body = [Group]),
        (status = 404, description = "User not found", body = crate::error::ApiErrorBody),
    ),
    tag = "Groups"
)]
pub async fn list_root_groups(
    State(state): State<AppState>,
    Path(user): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Group>>, ApiError> {
    state
        .store
        .user(&user)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let mut groups: Vec<Group> = state
        .store
        .groups()
        .await?
        .into_iter()
        .filter(|g| g.owner == user && g.parent.is_none())
        .collect();
    groups.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(paginate(groups, query.page)))
}

// ---------------------------------------------------------------------------
// GET /api/v1/groups/:id/children
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}/children",
    params(
        ("id" = String, Path, description = "Parent group id"),
        ("page" = Option<u32>, Query, description = "Zero-based page of 10"),
    ),
    responses(
        (status = 200, description = "Direct subgroups", body = [Group]),
        (status = 404, description = "Group not found", body = crate::error::ApiErrorBody),
    ),
    tag = "Groups"
)]
pub async fn list_child_groups(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Group>>, ApiError> {
    state
        .store
        .group(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    let mut groups: Vec<Group> = state
        .store
        .groups()
        .await?
        .into_iter()
        .filter(|g| g.parent.as_deref() == Some(id.as_str()))
        .collect();
    groups.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(paginate(groups, query.page)))
}

// ---------------------------------------------------------------------------
// GET /api/v1/users/:user/groups/leaves
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/users/{user}/groups/leaves",
    params(("user" = String, Path, description = "Owner id")),
    responses(
        (status = 200, description = "Groups with no subgroups", body = [GroupView]),
    ),
    tag = "Groups"
)]
pub async fn list_leaf_groups(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<Vec<GroupView>>, ApiError> {
    let groups = state.store.groups().await?;
    Ok(Json(hierarchy::leaf_groups(&user, &groups)))
}

// ---------------------------------------------------------------------------
// GET /api/v1/users/:user/groups/without-participants
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/users/{user}/groups/without-participants",
    params(("user" = String, Path, description = "Owner id")),
    responses(
        (status = 200, description = "Groups with zero participants", body = [GroupView]),
    ),
    tag = "Groups"
)]
pub async fn list_groups_without_participants(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<Vec<GroupView>>, ApiError> {
    let groups = state.store.groups().await?;
    let participants = state.store.participants().await?;
    Ok(Json(hierarchy::groups_without_participants(
        &user,
        &groups,
        &participants,
    )))
}

// ---------------------------------------------------------------------------
// GET /api/v1/users/:user/groups/with-participants
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/users/{user}/groups/with-participants",
    params(("user" = String, Path, description = "Owner id")),
    responses(
        (status = 200, description = "Groups with at least one participant", body = [GroupView]),
    ),
    tag = "Groups"
)]
pub async fn list_groups_with_participants(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<Vec<GroupView>>, ApiError> {
    let groups = state.store.groups().await?;
    let participants = state.store.participants().await?;
    Ok(Json(hierarchy::groups_with_participants(
        &user,
        &groups,
        &participants,
    )))
}

// ---------------------------------------------------------------------------
// GET /api/v1/groups/:id/result
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/groups/{id}/result",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Ranked vote tally", body = TallyResult),
        (status = 404, description = "Group not found", body = crate::error::ApiErrorBody),
    ),
    tag = "Groups"
)]
pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TallyResult>, ApiError> {
    let group = state
        .store
        .group(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    let participants = state.store.participants_by_group(&group.id).await?;
    let votes = state.store.votes().await?;

    Ok(Json(tally::tally(&group, &participants, &votes)))
}

// ---------------------------------------------------------------------------
// PATCH /api/v1/groups/:id
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    /// New parent group id. Ownership never changes through this endpoint.
    pub parent: Option<String>,
}

#[utoipa::path(
    patch,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path, description = "Group id")),
    request_body = UpdateGroupRequest,
    responses(
        (status = 200, description = "Updated group", body = Group),
        (status = 404, description = "Group or new parent not found", body = crate::error::ApiErrorBody),
    ),
    tag = "Groups"
)]
pub async fn update_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateGroupRequest>,
) -> Result<Json<Group>, ApiError> {
    let existing = state
        .store
        .group(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    let name = match &body.name {
        Some(name) => Some(validate_name(name)?),
        None => None,
    };

    if let Some(parent) = &body.parent {
        if existing.parent.as_deref() != Some(parent.as_str()) {
            state
                .store
                .group(parent)
                .await?
                .ok_or_else(|| ApiError::not_found("Parent group not found"))?;
        }
    }

    let updated = state
        .store
        .update_group(
            &id,
            UpdateGroup {
                name,
                parent: body.parent,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Group not found"))?;

    Ok(Json(updated))
}

// ---------------------------------------------------------------------------
// DELETE /api/v1/groups/:id
// ---------------------------------------------------------------------------

#[utoipa::path(
    delete,
    path = "/api/v1/groups/{id}",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 404, description = "Group not found", body = crate::error::ApiErrorBody),
    ),
    tag = "Groups"
)]
pub async fn delete_group(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.store.delete_group(&id).await? {
        return Err(ApiError::not_found("Group not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
