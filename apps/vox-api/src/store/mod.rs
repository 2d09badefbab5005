//! Document-store abstraction over the user/group/participant/vote
//! collections.
//!
//! Foreign keys are plain id strings; join logic lives in the query layer
//! (`crate::queries`), not here. Backed by an in-memory map store; a
//! persistent backend would implement the same trait.

pub mod documents;

pub use documents::{Group, Participant, UpdateGroup, UpdateParticipant, User, Vote};

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::error::ApiError;

use vox_common::id::{prefix, prefixed_ulid};

/// Abstraction over the document collections the service reads and writes.
#[async_trait]
pub trait Store: Send + Sync {
    // Users
    async fn insert_user(&self, name: &str, email: &str) -> Result<User, ApiError>;
    async fn user(&self, id: &str) -> Result<Option<User>, ApiError>;

    // Groups
    async fn insert_group(
        &self,
        name: &str,
        owner: &str,
        parent: Option<&str>,
    ) -> Result<Group, ApiError>;
    async fn group(&self, id: &str) -> Result<Option<Group>, ApiError>;
    /// The full group collection, as a snapshot.
    async fn groups(&self) -> Result<Vec<Group>, ApiError>;
    async fn update_group(&self, id: &str, changes: UpdateGroup) -> Result<Option<Group>, ApiError>;
    async fn delete_group(&self, id: &str) -> Result<bool, ApiError>;

    // Participants
    async fn insert_participant(&self, name: &str, group: &str) -> Result<Participant, ApiError>;
    async fn participant(&self, id: &str) -> Result<Option<Participant>, ApiError>;
    /// The full participant collection, as a snapshot.
    async fn participants(&self) -> Result<Vec<Participant>, ApiError>;
    async fn participants_by_group(&self, group: &str) -> Result<Vec<Participant>, ApiError>;
    async fn update_participant(
        &self,
        id: &str,
        changes: UpdateParticipant,
    ) -> Result<Option<Participant>, ApiError>;
    async fn delete_participant(&self, id: &str) -> Result<bool, ApiError>;

    // Votes
    async fn insert_vote(&self, participant: &str) -> Result<Vote, ApiError>;
    /// The full vote collection, as a snapshot.
    async fn votes(&self) -> Result<Vec<Vote>, ApiError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

pub struct MemoryStore {
    users: Mutex<HashMap<String, User>>,
    groups: Mutex<HashMap<String, Group>>,
    participants: Mutex<HashMap<String, Participant>>,
    votes: Mutex<HashMap<String, Vote>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            groups: Mutex::new(HashMap::new()),
            participants: Mutex::new(HashMap::new()),
            votes: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, name: &str, email: &str) -> Result<User, ApiError> {
        let user = User {
            id: prefixed_ulid(prefix::USER),
            name: name.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        self.users.lock().insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn user(&self, id: &str) -> Result<Option<User>, ApiError> {
        Ok(self.users.lock().get(id).cloned())
    }

    async fn insert_group(
        &self,
        name: &str,
        owner: &str,
        parent: Option<&str>,
    ) -> Result<Group, ApiError> {
        let group = Group {
            id: prefixed_ulid(prefix::GROUP),
            name: name.to_string(),
            owner: owner.to_string(),
            parent: parent.map(str::to_string),
            created_at: Utc::now(),
        };
        self.groups.lock().insert(group.id.clone(), group.clone());
        Ok(group)
    }

    async fn group(&self, id: &str) -> Result<Option<Group>, ApiError> {
        Ok(self.groups.lock().get(id).cloned())
    }

    async fn groups(&self) -> Result<Vec<Group>, ApiError> {
        Ok(self.groups.lock().values().cloned().collect())
    }

    async fn update_group(&self, id: &str, changes: UpdateGroup) -> Result<Option<Group>, ApiError> {
        let mut groups = self.groups.lock();
        let Some(group) = groups.get_mut(id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            group.name = name;
        }
        if let Some(parent) = changes.parent {
            group.parent = Some(parent);
        }
        Ok(Some(group.clone()))
    }

    async fn delete_group(&self, id: &str) -> Result<bool, ApiError> {
        Ok(self.groups.lock().remove(id).is_some())
    }

    async fn insert_participant(&self, name: &str, group: &str) -> Result<Participant, ApiError> {
        let participant = Participant {
            id: prefixed_ulid(prefix::PARTICIPANT),
            name: name.to_string(),
            group: group.to_string(),
            created_at: Utc::now(),
        };
        self.participants
            .lock()
            .insert(participant.id.clone(), participant.clone());
        Ok(participant)
    }

    async fn participant(&self, id: &str) -> Result<Option<Participant>, ApiError> {
        Ok(self.participants.lock().get(id).cloned())
    }

    async fn participants(&self) -> Result<Vec<Participant>, ApiError> {
        Ok(self.participants.lock().values().cloned().collect())
    }

    async fn participants_by_group(&self, group: &str) -> Result<Vec<Participant>, ApiError> {
        Ok(self
            .participants
            .lock()
            .values()
            .filter(|p| p.group == group)
            .cloned()
            .collect())
    }

    async fn update_participant(
        &self,
        id: &str,
        changes: UpdateParticipant,
    ) -> Result<Option<Participant>, ApiError> {
        let mut participants = self.participants.lock();
        let Some(participant) = participants.get_mut(id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            participant.name = name;
        }
        Ok(Some(participant.clone()))
    }

    async fn delete_participant(&self, id: &str) -> Result<bool, ApiError> {
        Ok(self.participants.lock().remove(id).is_some())
    }

    async fn insert_vote(&self, participant: &str) -> Result<Vote, ApiError> {
        let vote = Vote {
            id: prefixed_ulid(prefix::VOTE),
            participant: participant.to_string(),
            created_at: Utc::now(),
        };
        self.votes.lock().insert(vote.id.clone(), vote.clone());
        Ok(vote)
    }

    async fn votes(&self) -> Result<Vec<Vote>, ApiError> {
        Ok(self.votes.lock().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_and_fetch_group_round_trip() {
        let store = MemoryStore::new();
        let group = store.insert_group("Finance", "usr_1", None).await.unwrap();
        assert!(group.id.starts_with("grp_"));

        let fetched = store.group(&group.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Finance");
        assert_eq!(fetched.owner, "usr_1");
        assert!(fetched.parent.is_none());
    }

    #[tokio::test]
    async fn update_group_leaves_owner_untouched() {
        let store = MemoryStore::new();
        let group = store.insert_group("Old", "usr_1", None).await.unwrap();

        let updated = store
            .update_group(
                &group.id,
                UpdateGroup {
                    name: Some("New".to_string()),
                    parent: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "New");
        assert_eq!(updated.owner, "usr_1");
        assert!(updated.parent.is_none());
    }

    #[tokio::test]
    async fn update_unknown_group_returns_none() {
        let store = MemoryStore::new();
        let result = store
            .update_group("grp_missing", UpdateGroup::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent_on_unknown_ids() {
        let store = MemoryStore::new();
        let group = store.insert_group("G", "usr_1", None).await.unwrap();
        assert!(store.delete_group(&group.id).await.unwrap());
        assert!(!store.delete_group(&group.id).await.unwrap());
    }

    #[tokio::test]
    async fn participants_by_group_filters_on_group_id() {
        let store = MemoryStore::new();
        let g1 = store.insert_group("G1", "usr_1", None).await.unwrap();
        let g2 = store.insert_group("G2", "usr_1", None).await.unwrap();
        store.insert_participant("Ana", &g1.id).await.unwrap();
        store.insert_participant("Bia", &g1.id).await.unwrap();
        store.insert_participant("Caio", &g2.id).await.unwrap();

        let in_g1 = store.participants_by_group(&g1.id).await.unwrap();
        assert_eq!(in_g1.len(), 2);
        assert!(in_g1.iter().all(|p| p.group == g1.id));
    }
}
