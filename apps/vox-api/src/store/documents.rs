//! Stored document types. Foreign keys are carried as opaque id strings.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Group {
    pub id: String,
    pub name: String,
    /// Id of the user that owns this group.
    pub owner: String,
    /// Id of the parent group. Absent for root groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Participant {
    pub id: String,
    pub name: String,
    /// Id of the group this participant belongs to.
    pub group: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Vote {
    pub id: String,
    /// Id of the participant this vote was cast for.
    pub participant: String,
    pub created_at: DateTime<Utc>,
}

/// Field changes applied to a group. `None` leaves the field untouched;
/// ownership never changes.
#[derive(Debug, Default)]
pub struct UpdateGroup {
    pub name: Option<String>,
    pub parent: Option<String>,
}

/// Field changes applied to a participant. Group membership never changes.
#[derive(Debug, Default)]
pub struct UpdateParticipant {
    pub name: Option<String>,
}
