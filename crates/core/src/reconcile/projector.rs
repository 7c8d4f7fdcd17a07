//! Projection of fetched remote records into the local model shape.

use std::collections::BTreeSet;

use tracing::warn;

use super::fetch::RemoteSnapshot;
use crate::github::TeamNode;
use crate::models::{Member, Organization, ReviewAlgorithm, ReviewAssignmentPolicy, Team};

/// Convert a remote snapshot into an [`Organization`].
///
/// Member logins are collected into sorted sets and every member seen in any
/// team is entered into the member directory. Excluded members are never
/// populated: the remote cannot report them.
pub fn project(snapshot: &RemoteSnapshot) -> Organization {
    let mut org = Organization::new(snapshot.organization.clone());

    for node in &snapshot.teams {
        let mut members = BTreeSet::new();
        for member in &node.members.nodes {
            members.insert(member.login.clone());
            org.members.insert(
                member.login.clone(),
                Member {
                    id: member.id.clone(),
                    name: member.name.clone().unwrap_or_default(),
                },
            );
        }

        match org.teams.get_mut(&node.name) {
            Some(existing) => existing.members.extend(members),
            None => {
                org.teams.insert(
                    node.name.clone(),
                    Team {
                        id: node.id.clone(),
                        members,
                        review_assignment: project_policy(node),
                    },
                );
            }
        }
    }

    org
}

/// The review policy of a team. Teams with delegation disabled get the
/// zero-value policy regardless of the other reported fields.
fn project_policy(node: &TeamNode) -> ReviewAssignmentPolicy {
    if !node.review_request_delegation_enabled {
        return ReviewAssignmentPolicy::default();
    }

    let algorithm = node
        .review_request_delegation_algorithm
        .as_deref()
        .and_then(|raw| {
            let parsed = ReviewAlgorithm::from_api(raw);
            if parsed.is_none() {
                warn!(team = %node.name, algorithm = raw, "unknown review assignment algorithm");
            }
            parsed
        });

    ReviewAssignmentPolicy {
        enabled: true,
        algorithm,
        notify_team: node.review_request_delegation_notify_team,
        member_count: node.review_request_delegation_member_count.unwrap_or(0),
        excluded_members: Vec::new(),
    }
}
