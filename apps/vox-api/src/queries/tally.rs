//! Ranked vote tallies for a group.

use serde::Serialize;
use utoipa::ToSchema;

use crate::store::{Group, Participant, Vote};

/// Aggregated poll result for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TallyResult {
    pub group: GroupHeader,
    pub participants: Vec<ParticipantTally>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GroupHeader {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ParticipantTally {
    pub id: String,
    pub name: String,
    pub votes: u64,
}

/// Join group → participants → votes by id equality and rank the outcome.
///
/// Counts are computed fresh from the vote snapshot on every call, never
/// cached or incrementally maintained. Ties rank by name ascending
/// (case-sensitive byte order), so the result is a total order. A group with
/// no participants yields an empty list.
pub fn tally(group: &Group, participants: &[Participant], votes: &[Vote]) -> TallyResult {
    let mut ranked: Vec<ParticipantTally> = participants
        .iter()
        .filter(|p| p.group == group.id)
        .map(|p| ParticipantTally {
            id: p.id.clone(),
            name: p.name.clone(),
            votes: votes.iter().filter(|v| v.participant == p.id).count() as u64,
        })
        .collect();

    ranked.sort_by(|a, b| b.votes.cmp(&a.votes).then_with(|| a.name.cmp(&b.name)));

    TallyResult {
        group: GroupHeader {
            id: group.id.clone(),
            name: group.name.clone(),
        },
        participants: ranked,
    }
}
