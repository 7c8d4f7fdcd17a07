//! Domain model types shared by the local state file and the remote
//! snapshot.
//!
//! Both sides of a reconciliation are expressed as an [`Organization`] so
//! they can be compared structurally.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::LookupError;

// ---------------------------------------------------------------------------
// Organization
// ---------------------------------------------------------------------------

/// The root scope: every team and the member directory of one organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Organization {
    /// Organization login (e.g. `acme`).
    pub organization: String,

    /// Logins excluded from review assignment in every team they belong to.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub exclude_review_from_all_teams: BTreeSet<String>,

    /// Member directory keyed by login.
    #[serde(default)]
    pub members: BTreeMap<String, Member>,

    /// Teams keyed by their display name.
    #[serde(default)]
    pub teams: BTreeMap<String, Team>,
}

/// An organization member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    /// Stable remote node ID.
    pub id: String,

    /// Display name; empty when the member has not set one.
    #[serde(default)]
    pub name: String,
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// A team: its remote ID, member logins and review assignment policy.
///
/// The team name is not stored here; it is the key in
/// [`Organization::teams`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Team {
    /// Stable remote node ID. Only used to address the team remotely.
    #[serde(default)]
    pub id: String,

    /// Member logins, always sorted and free of duplicates.
    #[serde(default)]
    pub members: BTreeSet<String>,

    /// Code review assignment settings.
    #[serde(default)]
    pub review_assignment: ReviewAssignmentPolicy,
}

/// Review assignment algorithm, as named by the GitHub API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewAlgorithm {
    RoundRobin,
    LoadBalance,
}

impl ReviewAlgorithm {
    /// Parse the API's string form. Unknown values yield `None`.
    pub fn from_api(value: &str) -> Option<Self> {
        match value {
            "ROUND_ROBIN" => Some(Self::RoundRobin),
            "LOAD_BALANCE" => Some(Self::LoadBalance),
            _ => None,
        }
    }

    pub fn as_api_str(self) -> &'static str {
        match self {
            Self::RoundRobin => "ROUND_ROBIN",
            Self::LoadBalance => "LOAD_BALANCE",
        }
    }
}

impl std::fmt::Display for ReviewAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_api_str())
    }
}

/// Automatic reviewer delegation settings for a team.
///
/// The remote API reports every field except `excluded_members`, which only
/// exists locally.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewAssignmentPolicy {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<ReviewAlgorithm>,

    #[serde(default)]
    pub notify_team: bool,

    #[serde(default)]
    pub member_count: u32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_members: Vec<ExcludedMember>,
}

/// A member excluded from review assignment within one team.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExcludedMember {
    pub login: String,

    /// Free-form note for the humans maintaining the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ExcludedMember {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            reason: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Local edits
// ---------------------------------------------------------------------------

impl Organization {
    /// Create an empty organization.
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            ..Default::default()
        }
    }

    /// Add a team known to the remote under `name` with remote `id`.
    pub fn add_team(&mut self, name: &str, id: &str) -> Result<(), LookupError> {
        if self.teams.contains_key(name) {
            return Err(LookupError::DuplicateTeam(name.to_string()));
        }
        self.teams.insert(
            name.to_string(),
            Team {
                id: id.to_string(),
                ..Default::default()
            },
        );
        debug!(team = name, id, "added team to local organization");
        Ok(())
    }

    /// Replace the members of `team` with `logins`.
    ///
    /// Every login must exist in the member directory; all unknown logins
    /// are reported together and the team is left untouched.
    pub fn set_team_members<I, S>(&mut self, team: &str, logins: I) -> Result<(), LookupError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let logins: BTreeSet<String> = logins.into_iter().map(Into::into).collect();
        let unknown: Vec<String> = logins
            .iter()
            .filter(|login| !self.members.contains_key(*login))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(LookupError::UnknownMembers(unknown));
        }

        let entry = self
            .teams
            .get_mut(team)
            .ok_or_else(|| LookupError::UnknownTeam(team.to_string()))?;
        entry.members = logins;
        Ok(())
    }

    /// Add `logins` to the current members of `team`.
    pub fn add_team_members<I, S>(&mut self, team: &str, logins: I) -> Result<(), LookupError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let current = self
            .teams
            .get(team)
            .ok_or_else(|| LookupError::UnknownTeam(team.to_string()))?
            .members
            .clone();
        let merged: BTreeSet<String> = current
            .into_iter()
            .chain(logins.into_iter().map(Into::into))
            .collect();
        self.set_team_members(team, merged)
    }

    /// Copy the locally-maintained fields that the remote cannot report from
    /// `previous` into `self`.
    ///
    /// Used when a freshly projected remote snapshot replaces the local
    /// file, so per-team exclusions and the org-wide exclusion list survive.
    pub fn carry_local_only_fields(&mut self, previous: &Organization) {
        self.exclude_review_from_all_teams = previous.exclude_review_from_all_teams.clone();
        for (name, team) in self.teams.iter_mut() {
            if let Some(prev) = previous.teams.get(name) {
                team.review_assignment.excluded_members =
                    prev.review_assignment.excluded_members.clone();
            }
        }
    }
}
