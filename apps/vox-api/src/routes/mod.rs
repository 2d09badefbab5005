pub mod groups;
pub mod health;
pub mod participants;
pub mod users;
pub mod votes;

use axum::Router;
use utoipa::OpenApi;

use crate::error::{ApiError, FieldError};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::gateway::server::router())
        .nest(
            "/api/v1",
            users::router()
                .merge(groups::router())
                .merge(participants::router())
                .merge(votes::router()),
        )
}

/// Listings page by 10, sorted by the caller before slicing.
pub(crate) const PAGE_SIZE: usize = 10;

pub(crate) fn paginate<T>(items: Vec<T>, page: u32) -> Vec<T> {
    items
        .into_iter()
        .skip(page as usize * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect()
}

/// Trim and validate a display name.
pub(crate) fn validate_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::validation(vec![FieldError {
            field: "name".to_string(),
            message: "Name is required".to_string(),
        }]));
    }
    if name.len() > 100 {
        return Err(ApiError::validation(vec![FieldError {
            field: "name".to_string(),
            message: "Name must be 100 characters or fewer".to_string(),
        }]));
    }
    Ok(name)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Users
        users::create_user,
        users::get_user,
        // Groups
        groups::create_group,
        groups::get_group,
        groups::list_root_groups,
        groups::list_child_groups,
        groups::list_leaf_groups,
        groups::list_groups_without_participants,
        groups::list_groups_with_participants,
        groups::get_result,
        groups::update_group,
        groups::delete_group,
        // Participants
        participants::create_participant,
        participants::get_participant,
        participants::list_group_participants,
        participants::update_participant,
        participants::delete_participant,
        // Votes
        votes::create_vote,
    ),
    components(
        schemas(
            // Error types
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            crate::error::FieldError,
            // Documents
            crate::store::documents::User,
            crate::store::documents::Group,
            crate::store::documents::Participant,
            crate::store::documents::Vote,
            // Derived views
            crate::queries::hierarchy::GroupView,
            crate::queries::tally::TallyResult,
            crate::queries::tally::GroupHeader,
            crate::queries::tally::ParticipantTally,
            // Route request types
            users::CreateUserRequest,
            groups::CreateGroupRequest,
            groups::UpdateGroupRequest,
            participants::CreateParticipantRequest,
            participants::UpdateParticipantRequest,
            votes::CreateVoteRequest,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Users", description = "Group owners"),
        (name = "Groups", description = "Group hierarchy and poll results"),
        (name = "Participants", description = "Participants nominated under groups"),
        (name = "Votes", description = "Cast votes"),
    )
)]
pub struct ApiDoc;
