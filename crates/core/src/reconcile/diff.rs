//! Structural comparison of local and remote teams.
//!
//! Teams are compared field by field under a [`ComparisonMask`] naming the
//! fields to ignore. The default mask ignores the excluded-member list,
//! which the remote cannot report. Team IDs are never compared.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use serde::Serialize;
use tracing::{debug, info};

use crate::models::{Organization, Team};

// ---------------------------------------------------------------------------
// Fields & mask
// ---------------------------------------------------------------------------

/// A comparable field of a [`Team`].
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TeamField {
    Members,
    ReviewEnabled,
    ReviewAlgorithm,
    NotifyTeam,
    MemberCount,
    ExcludedMembers,
}

impl TeamField {
    pub const ALL: [TeamField; 6] = [
        TeamField::Members,
        TeamField::ReviewEnabled,
        TeamField::ReviewAlgorithm,
        TeamField::NotifyTeam,
        TeamField::MemberCount,
        TeamField::ExcludedMembers,
    ];

    fn differs(self, local: &Team, remote: &Team) -> bool {
        let (l, r) = (&local.review_assignment, &remote.review_assignment);
        match self {
            Self::Members => local.members != remote.members,
            Self::ReviewEnabled => l.enabled != r.enabled,
            Self::ReviewAlgorithm => l.algorithm != r.algorithm,
            Self::NotifyTeam => l.notify_team != r.notify_team,
            Self::MemberCount => l.member_count != r.member_count,
            Self::ExcludedMembers => l.excluded_members != r.excluded_members,
        }
    }

    fn render(self, team: &Team) -> String {
        let policy = &team.review_assignment;
        match self {
            Self::Members => format!("[{}]", join(team.members.iter())),
            Self::ReviewEnabled => policy.enabled.to_string(),
            Self::ReviewAlgorithm => policy
                .algorithm
                .map(|a| a.to_string())
                .unwrap_or_else(|| "none".into()),
            Self::NotifyTeam => policy.notify_team.to_string(),
            Self::MemberCount => policy.member_count.to_string(),
            Self::ExcludedMembers => format!(
                "[{}]",
                join(policy.excluded_members.iter().map(|m| &m.login))
            ),
        }
    }
}

impl std::fmt::Display for TeamField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Members => write!(f, "members"),
            Self::ReviewEnabled => write!(f, "review_assignment.enabled"),
            Self::ReviewAlgorithm => write!(f, "review_assignment.algorithm"),
            Self::NotifyTeam => write!(f, "review_assignment.notify_team"),
            Self::MemberCount => write!(f, "review_assignment.member_count"),
            Self::ExcludedMembers => write!(f, "review_assignment.excluded_members"),
        }
    }
}

/// Fields the comparison must ignore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonMask {
    ignored: BTreeSet<TeamField>,
}

impl ComparisonMask {
    /// Compare every field.
    pub fn none() -> Self {
        Self {
            ignored: BTreeSet::new(),
        }
    }

    /// Ignore the fields the remote cannot report.
    pub fn remote_unreportable() -> Self {
        Self::none().ignore(TeamField::ExcludedMembers)
    }

    pub fn ignore(mut self, field: TeamField) -> Self {
        self.ignored.insert(field);
        self
    }

    pub fn ignores(&self, field: TeamField) -> bool {
        self.ignored.contains(&field)
    }
}

impl Default for ComparisonMask {
    fn default() -> Self {
        Self::remote_unreportable()
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One differing field, rendered for display.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldDiff {
    pub field: TeamField,
    pub local: String,
    pub remote: String,
}

impl std::fmt::Display for FieldDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: local={} remote={}", self.field, self.local, self.remote)
    }
}

/// Membership changes needed to bring one remote team to its local state.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PendingChange {
    pub to_add: BTreeSet<String>,
    pub to_remove: BTreeSet<String>,
}

impl PendingChange {
    /// `to_add = local - remote`, `to_remove = remote - local`.
    pub fn between(local: &BTreeSet<String>, remote: &BTreeSet<String>) -> Self {
        Self {
            to_add: local.difference(remote).cloned().collect(),
            to_remove: remote.difference(local).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// The member set after applying this change to `original`.
    pub fn apply(&self, original: &BTreeSet<String>) -> BTreeSet<String> {
        apply_change(original, &self.to_add, &self.to_remove)
    }
}

/// `(original ∪ to_add) − to_remove`.
pub fn apply_change(
    original: &BTreeSet<String>,
    to_add: &BTreeSet<String>,
    to_remove: &BTreeSet<String>,
) -> BTreeSet<String> {
    original
        .union(to_add)
        .filter(|login| !to_remove.contains(*login))
        .cloned()
        .collect()
}

/// Outcome of comparing a local organization with the remote one.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DiffReport {
    /// Teams needing membership changes, keyed by team name.
    pub changes: BTreeMap<String, PendingChange>,
    /// Every out-of-sync team with its differing fields.
    pub drift: BTreeMap<String, Vec<FieldDiff>>,
}

impl DiffReport {
    /// True when no team needs a membership change.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Human-readable list of the pending membership changes.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (team, change) in &self.changes {
            let _ = writeln!(out, " Team: {team}");
            let _ = writeln!(out, "    Adding members: {}", join(change.to_add.iter()));
            let _ = writeln!(out, "  Removing members: {}", join(change.to_remove.iter()));
        }
        out
    }

    /// Human-readable "local vs remote" lines for every drifting team.
    pub fn drift_summary(&self) -> String {
        let mut out = String::new();
        for (team, fields) in &self.drift {
            let _ = writeln!(out, "Local team {team} out of sync with remote:");
            for field in fields {
                let _ = writeln!(out, "  {field}");
            }
        }
        out
    }
}

fn join<'a, I: Iterator<Item = &'a String>>(items: I) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(", ")
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Fields of `local` and `remote` that differ and are not masked.
pub fn compare_teams(local: &Team, remote: &Team, mask: &ComparisonMask) -> Vec<FieldDiff> {
    TeamField::ALL
        .iter()
        .copied()
        .filter(|field| !mask.ignores(*field) && field.differs(local, remote))
        .map(|field| FieldDiff {
            field,
            local: field.render(local),
            remote: field.render(remote),
        })
        .collect()
}

/// Compare every local team with its remote namesake.
///
/// A team missing remotely is compared against an empty team. A pending
/// change is recorded only when the team differs and its member sets do.
pub fn diff_organization(
    local: &Organization,
    remote: &Organization,
    mask: &ComparisonMask,
) -> DiffReport {
    let absent = Team::default();
    let mut report = DiffReport::default();

    for (name, local_team) in &local.teams {
        let remote_team = match remote.teams.get(name) {
            Some(team) => team,
            None => {
                debug!(team = %name, "team not present remotely");
                &absent
            }
        };

        let fields = compare_teams(local_team, remote_team, mask);
        if fields.is_empty() {
            continue;
        }
        info!(team = %name, fields = fields.len(), "local team out of sync with remote");

        let change = PendingChange::between(&local_team.members, &remote_team.members);
        if !change.is_empty() {
            report.changes.insert(name.clone(), change);
        }
        report.drift.insert(name.clone(), fields);
    }

    report
}
