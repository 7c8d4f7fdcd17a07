//! Confirmation and application of reconciliation changes.
//!
//! A run has two independent passes, each behind its own confirmation:
//!
//! 1. **Membership**: add and remove team members so every remote team
//!    matches its local definition.
//! 2. **Review policy**: submit every local team's review assignment
//!    settings, including the resolved excluded members.
//!
//! A failure on one team is reported and the pass moves on to the next
//! team. In dry-run mode no mutation is issued, but the returned
//! organization reflects the intended end state exactly as a live run would.

use serde::Serialize;
use tracing::{error, info, warn};

use super::diff::{diff_organization, ComparisonMask, DiffReport, PendingChange};
use super::exclusion::resolve_excluded_members;
use super::fetch::fetch_snapshot;
use super::projector::project;
use crate::errors::{GitHubError, LookupError, SyncError};
use crate::github::{slug, ReviewAssignmentUpdate, TeamsApi};
use crate::models::Organization;
use crate::operator::Operator;

const MEMBERSHIP_PROMPT: &str = "Continue?";
const POLICY_PROMPT: &str = "Do you want to update review assignment policies?";

/// How changes are confirmed and applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionMode {
    /// Skip confirmation prompts and proceed as if answered "yes".
    pub force: bool,
    /// Report changes and update the local model, but issue no mutations.
    pub dry_run: bool,
}

/// A team whose changes could not be applied.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TeamFailure {
    pub team: String,
    pub message: String,
}

/// What a reconciliation run did.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SyncReport {
    pub dry_run: bool,
    /// Whether the membership pass was confirmed (false if nothing to do).
    pub membership_confirmed: bool,
    /// Teams whose membership changes were applied (or would be, in dry-run).
    pub membership_applied: Vec<String>,
    pub membership_failed: Vec<TeamFailure>,
    pub policy_confirmed: bool,
    /// Teams whose review policy was submitted (or would be, in dry-run).
    pub policy_updated: Vec<String>,
    pub policy_failed: Vec<TeamFailure>,
    /// Exclusions and teams that could not be resolved.
    #[serde(skip)]
    pub unresolved: Vec<LookupError>,
}

impl SyncReport {
    pub fn has_failures(&self) -> bool {
        !self.membership_failed.is_empty() || !self.policy_failed.is_empty()
    }
}

/// Result of [`Reconciler::sync_teams`].
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// The local organization after the run, ready to be stored.
    pub organization: Organization,
    pub diff: DiffReport,
    pub report: SyncReport,
}

/// Drives one reconciliation run against a [`TeamsApi`].
pub struct Reconciler<'a, A: TeamsApi + ?Sized> {
    api: &'a A,
    operator: &'a dyn Operator,
    mode: ExecutionMode,
    mask: ComparisonMask,
}

impl<'a, A: TeamsApi + ?Sized> Reconciler<'a, A> {
    pub fn new(api: &'a A, operator: &'a dyn Operator, mode: ExecutionMode) -> Self {
        Self {
            api,
            operator,
            mode,
            mask: ComparisonMask::default(),
        }
    }

    /// Replace the comparison mask used by [`diff`](Self::diff).
    pub fn with_mask(mut self, mask: ComparisonMask) -> Self {
        self.mask = mask;
        self
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    // -----------------------------------------------------------------------
    // Reading
    // -----------------------------------------------------------------------

    /// Fetch the remote organization and project it into the local shape.
    pub async fn fetch_remote(&self, organization: &str) -> Result<Organization, SyncError> {
        let snapshot = fetch_snapshot(self.api, organization).await?;
        Ok(project(&snapshot))
    }

    /// Compare `local` with the current remote state.
    pub async fn diff(&self, local: &Organization) -> Result<DiffReport, SyncError> {
        let remote = self.fetch_remote(&local.organization).await?;
        Ok(diff_organization(local, &remote, &self.mask))
    }

    // -----------------------------------------------------------------------
    // Main entry point
    // -----------------------------------------------------------------------

    /// Run a full reconciliation of `local` against the remote.
    ///
    /// Only a failed fetch or a failed prompt aborts the run; per-team
    /// failures end up in the report.
    pub async fn sync_teams(&self, mut local: Organization) -> Result<SyncOutcome, SyncError> {
        info!(
            organization = %local.organization,
            force = self.mode.force,
            dry_run = self.mode.dry_run,
            "starting team reconciliation"
        );
        let diff = self.diff(&local).await?;
        if !diff.drift.is_empty() {
            self.operator.notice(diff.drift_summary().trim_end());
        }

        let mut report = SyncReport {
            dry_run: self.mode.dry_run,
            ..Default::default()
        };
        self.apply_membership(&mut local, &diff, &mut report).await?;
        self.apply_review_policies(&local, &mut report).await?;

        info!(
            membership_applied = report.membership_applied.len(),
            membership_failed = report.membership_failed.len(),
            policy_updated = report.policy_updated.len(),
            policy_failed = report.policy_failed.len(),
            "team reconciliation finished"
        );
        Ok(SyncOutcome {
            organization: local,
            diff,
            report,
        })
    }

    // -----------------------------------------------------------------------
    // Membership pass
    // -----------------------------------------------------------------------

    /// Confirm and apply the membership changes in `diff`, updating the
    /// member lists of `local` for every team that was (or would be)
    /// changed.
    pub async fn apply_membership(
        &self,
        local: &mut Organization,
        diff: &DiffReport,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        if diff.is_empty() {
            info!("team memberships already in sync");
            return Ok(());
        }

        self.operator.present_changes(diff);
        if !self.confirmed(MEMBERSHIP_PROMPT)? {
            info!("membership changes declined");
            return Ok(());
        }
        report.membership_confirmed = true;

        for (team_name, change) in &diff.changes {
            if !self.mode.dry_run {
                if let Err(e) = self
                    .sync_team_members(&local.organization, team_name, change)
                    .await
                {
                    error!(team = %team_name, error = %e, "unable to sync team members");
                    self.operator
                        .error(&format!("Unable to sync team {}: {}", team_name, e));
                    report.membership_failed.push(TeamFailure {
                        team: team_name.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            } else {
                self.report_dry_run(team_name, change);
            }

            if let Some(team) = local.teams.get_mut(team_name) {
                team.members = change.apply(&team.members);
            }
            report.membership_applied.push(team_name.clone());
        }
        Ok(())
    }

    /// Issue one add call per added login, then one remove call per
    /// removed login. Stops at the first failure.
    async fn sync_team_members(
        &self,
        organization: &str,
        team_name: &str,
        change: &PendingChange,
    ) -> Result<(), GitHubError> {
        let team_slug = slug(team_name);
        for login in &change.to_add {
            self.operator
                .notice(&format!("Adding member {} to team {}", login, team_name));
            self.api
                .add_team_member(organization, &team_slug, login)
                .await?;
        }
        for login in &change.to_remove {
            self.operator
                .notice(&format!("Removing member {} from team {}", login, team_name));
            self.api
                .remove_team_member(organization, &team_slug, login)
                .await?;
        }
        Ok(())
    }

    fn report_dry_run(&self, team_name: &str, change: &PendingChange) {
        for login in &change.to_add {
            self.operator.notice(&format!(
                "[dry-run] Would add member {} to team {}",
                login, team_name
            ));
        }
        for login in &change.to_remove {
            self.operator.notice(&format!(
                "[dry-run] Would remove member {} from team {}",
                login, team_name
            ));
        }
    }

    // -----------------------------------------------------------------------
    // Review policy pass
    // -----------------------------------------------------------------------

    /// Confirm and submit the review assignment policy of every local team,
    /// in team-name order.
    pub async fn apply_review_policies(
        &self,
        local: &Organization,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        if !self.confirmed(POLICY_PROMPT)? {
            info!("review policy update declined");
            return Ok(());
        }
        report.policy_confirmed = true;

        for (team_name, team) in &local.teams {
            if team.id.is_empty() {
                let err = LookupError::MissingTeamId(team_name.clone());
                warn!(team = %team_name, "skipping review policy for team without remote id");
                self.operator.error(&err.to_string());
                report.policy_failed.push(TeamFailure {
                    team: team_name.clone(),
                    message: err.to_string(),
                });
                report.unresolved.push(err);
                continue;
            }

            let policy = &team.review_assignment;
            let resolution = resolve_excluded_members(
                team_name,
                &team.members,
                &local.members,
                &policy.excluded_members,
                &local.exclude_review_from_all_teams,
            );
            for unresolved in &resolution.unresolved {
                self.operator.error(&unresolved.to_string());
            }
            report.unresolved.extend(resolution.unresolved);

            let update = ReviewAssignmentUpdate {
                team_id: team.id.clone(),
                enabled: policy.enabled,
                algorithm: policy.algorithm,
                notify_team: policy.notify_team,
                member_count: policy.member_count,
                excluded_member_ids: resolution.member_ids.into_iter().collect(),
            };

            if self.mode.dry_run {
                self.operator.notice(&format!(
                    "[dry-run] Would update review assignment for team {}",
                    team_name
                ));
            } else {
                self.operator
                    .notice(&format!("Updating review assignment for team {}", team_name));
                if let Err(e) = self.api.update_review_assignment(&update).await {
                    error!(team = %team_name, error = %e, "unable to update review assignment");
                    self.operator.error(&format!(
                        "Unable to sync review assignment of team {}: {}",
                        team_name, e
                    ));
                    report.policy_failed.push(TeamFailure {
                        team: team_name.clone(),
                        message: e.to_string(),
                    });
                    continue;
                }
            }
            report.policy_updated.push(team_name.clone());
        }
        Ok(())
    }

    fn confirmed(&self, prompt: &str) -> Result<bool, SyncError> {
        if self.mode.force {
            return Ok(true);
        }
        self.operator.confirm(prompt)
    }
}
