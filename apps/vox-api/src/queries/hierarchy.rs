//! Group hierarchy views: classifies an owner's groups by leaf/participant
//! status and rewrites parent ids to display names.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use utoipa::ToSchema;

use crate::store::{Group, Participant};

/// A group prepared for display: parent rewritten from an id to the parent's
/// name, plus a subgroup flag. Root groups have no `parent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GroupView {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub is_subgroup: bool,
}

/// The owner's groups that no group references as parent.
///
/// The anti-join runs against the whole collection, not just the owner's
/// slice, so a child belonging to another user still disqualifies its parent.
pub fn leaf_groups(owner: &str, groups: &[Group]) -> Vec<GroupView> {
    let referenced_as_parent: HashSet<&str> =
        groups.iter().filter_map(|g| g.parent.as_deref()).collect();

    collect_views(owner, groups, |g| {
        !referenced_as_parent.contains(g.id.as_str())
    })
}

/// The owner's groups with zero participants.
pub fn groups_without_participants(
    owner: &str,
    groups: &[Group],
    participants: &[Participant],
) -> Vec<GroupView> {
    let populated = populated_groups(participants);
    collect_views(owner, groups, |g| !populated.contains(g.id.as_str()))
}

/// The owner's groups with at least one participant.
pub fn groups_with_participants(
    owner: &str,
    groups: &[Group],
    participants: &[Participant],
) -> Vec<GroupView> {
    let populated = populated_groups(participants);
    collect_views(owner, groups, |g| populated.contains(g.id.as_str()))
}

fn populated_groups(participants: &[Participant]) -> HashSet<&str> {
    participants.iter().map(|p| p.group.as_str()).collect()
}

fn collect_views<F>(owner: &str, groups: &[Group], keep: F) -> Vec<GroupView>
where
    F: Fn(&Group) -> bool,
{
    let names: HashMap<&str, &str> = groups
        .iter()
        .map(|g| (g.id.as_str(), g.name.as_str()))
        .collect();

    let mut views: Vec<GroupView> = groups
        .iter()
        .filter(|g| g.owner == owner && keep(g))
        .map(|g| view_of(g, &names))
        .collect();

    // Siblings group under their parent's display name (roots first), then
    // top-level groups sort before subgroups, then alphabetical.
    views.sort_by(|a, b| {
        a.parent
            .cmp(&b.parent)
            .then_with(|| a.is_subgroup.cmp(&b.is_subgroup))
            .then_with(|| a.name.cmp(&b.name))
    });
    views
}

/// A dangling parent id keeps the subgroup flag but resolves no name. Cycles
/// cannot hang this: every group resolves its parent with a single lookup.
fn view_of(group: &Group, names: &HashMap<&str, &str>) -> GroupView {
    GroupView {
        id: group.id.clone(),
        name: group.name.clone(),
        parent: group
            .parent
            .as_deref()
            .and_then(|id| names.get(id))
            .map(|name| (*name).to_string()),
        is_subgroup: group.parent.is_some(),
    }
}
