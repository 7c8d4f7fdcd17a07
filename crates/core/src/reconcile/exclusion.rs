//! Resolution of review-assignment exclusions to member IDs.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, error};

use crate::errors::LookupError;
use crate::models::{ExcludedMember, Member};

/// Member IDs to exclude from one team's review assignment, plus the
/// per-team exclusions that could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionResolution {
    pub member_ids: BTreeSet<String>,
    pub unresolved: Vec<LookupError>,
}

/// Resolve the excluded member IDs of `team`.
///
/// Per-team exclusions must resolve through `directory`; each login that
/// does not is logged and returned in `unresolved`. Organization-wide
/// exclusions only apply to logins that belong to the team and resolve
/// through the directory; anything else is skipped silently.
pub fn resolve_excluded_members(
    team: &str,
    team_members: &BTreeSet<String>,
    directory: &BTreeMap<String, Member>,
    per_team: &[ExcludedMember],
    org_wide: &BTreeSet<String>,
) -> ExclusionResolution {
    let mut resolution = ExclusionResolution::default();

    for excluded in per_team {
        match directory.get(&excluded.login) {
            Some(member) => {
                resolution.member_ids.insert(member.id.clone());
            }
            None => {
                error!(
                    team,
                    login = %excluded.login,
                    "excluded user not found in the organization member directory"
                );
                resolution.unresolved.push(LookupError::UnknownExcludedMember {
                    team: team.to_string(),
                    login: excluded.login.clone(),
                });
            }
        }
    }

    for login in org_wide {
        if !team_members.contains(login) {
            continue;
        }
        if let Some(member) = directory.get(login) {
            resolution.member_ids.insert(member.id.clone());
        }
    }

    debug!(
        team,
        excluded = resolution.member_ids.len(),
        unresolved = resolution.unresolved.len(),
        "resolved review exclusions"
    );
    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory(logins: &[&str]) -> BTreeMap<String, Member> {
        logins
            .iter()
            .map(|login| {
                (
                    login.to_string(),
                    Member {
                        id: format!("U_{login}"),
                        name: String::new(),
                    },
                )
            })
            .collect()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_per_team_exclusions_resolve_to_ids() {
        let result = resolve_excluded_members(
            "ops",
            &set(&["alice", "bob"]),
            &directory(&["alice", "bob"]),
            &[ExcludedMember::new("bob"), ExcludedMember::new("bob")],
            &BTreeSet::new(),
        );
        assert_eq!(result.member_ids, set(&["U_bob"]));
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn test_unknown_per_team_login_is_reported_and_skipped() {
        let result = resolve_excluded_members(
            "ops",
            &set(&["alice"]),
            &directory(&["alice"]),
            &[ExcludedMember::new("ghost"), ExcludedMember::new("alice")],
            &BTreeSet::new(),
        );
        assert_eq!(result.member_ids, set(&["U_alice"]));
        assert_eq!(
            result.unresolved,
            vec![LookupError::UnknownExcludedMember {
                team: "ops".into(),
                login: "ghost".into(),
            }]
        );
    }

    #[test]
    fn test_org_wide_exclusion_outside_team_is_silent() {
        let result = resolve_excluded_members(
            "ops",
            &set(&["alice"]),
            &directory(&["alice", "carol"]),
            &[],
            &set(&["carol", "nobody"]),
        );
        assert!(result.member_ids.is_empty());
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn test_org_wide_and_per_team_merge_without_duplicates() {
        let result = resolve_excluded_members(
            "ops",
            &set(&["alice", "bob"]),
            &directory(&["alice", "bob"]),
            &[ExcludedMember::new("alice")],
            &set(&["alice", "bob"]),
        );
        assert_eq!(result.member_ids, set(&["U_alice", "U_bob"]));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let members = set(&["alice", "bob"]);
        let dir = directory(&["alice", "bob"]);
        let per_team = [ExcludedMember::new("bob"), ExcludedMember::new("ghost")];
        let org_wide = set(&["alice"]);

        let first = resolve_excluded_members("ops", &members, &dir, &per_team, &org_wide);
        let second = resolve_excluded_members("ops", &members, &dir, &per_team, &org_wide);
        assert_eq!(first, second);
    }
}
