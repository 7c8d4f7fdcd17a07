//! GitHub access for teamsync.
//!
//! [`TeamsApi`] is the seam between the reconciliation engine and the
//! remote platform; [`GitHubClient`] implements it over HTTP.

pub mod client;
pub mod query;
pub mod slug;

use async_trait::async_trait;

use crate::errors::GitHubError;

pub use client::GitHubClient;
pub use query::{
    MemberNode, MembersPage, PageInfo, PageRequest, RemoteTeam, ReviewAssignmentUpdate, TeamNode,
    TeamsPage,
};
pub use slug::slug;

/// Remote operations the reconciliation engine needs.
#[async_trait]
pub trait TeamsApi: Send + Sync {
    /// Fetch one page of teams (each with one page of members).
    async fn query_teams(
        &self,
        organization: &str,
        request: &PageRequest,
    ) -> Result<TeamsPage, GitHubError>;

    /// Add `login` to the team addressed by `team_slug` as a regular member.
    async fn add_team_member(
        &self,
        organization: &str,
        team_slug: &str,
        login: &str,
    ) -> Result<(), GitHubError>;

    /// Remove `login` from the team addressed by `team_slug`.
    async fn remove_team_member(
        &self,
        organization: &str,
        team_slug: &str,
        login: &str,
    ) -> Result<(), GitHubError>;

    /// Replace the review assignment settings of one team.
    async fn update_review_assignment(
        &self,
        update: &ReviewAssignmentUpdate,
    ) -> Result<(), GitHubError>;

    /// Look up a single team by slug.
    async fn get_team_by_slug(
        &self,
        organization: &str,
        team_slug: &str,
    ) -> Result<RemoteTeam, GitHubError>;
}
