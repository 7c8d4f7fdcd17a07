//! Cursor-paginated retrieval of an organization's teams and members.
//!
//! Teams are paged through with a [`TeamsCursor`]. Every team on a page
//! arrives with its first page of members; further member pages are
//! requested by re-issuing the same team page query with a
//! [`MembersCursor`]. A members cursor borrows the teams cursor it belongs
//! to, so the teams cursor cannot advance while one is alive and each team
//! starts from its first member page.

use tracing::{debug, info};

use crate::errors::{CoreError, GitHubError, SyncError};
use crate::github::{slug, PageInfo, PageRequest, TeamNode, TeamsApi};
use crate::models::Organization;

/// Every team of one organization with all of its members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteSnapshot {
    pub organization: String,
    /// Teams in the order the remote returned them. Each node's `members`
    /// holds the complete member list.
    pub teams: Vec<TeamNode>,
}

// ---------------------------------------------------------------------------
// Cursors
// ---------------------------------------------------------------------------

/// Position within the organization's team collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamsCursor {
    after: Option<String>,
}

impl TeamsCursor {
    /// Cursor addressing the first page of teams.
    pub fn start() -> Self {
        Self::default()
    }

    /// Move past `page`. Fails when the page claims more results but
    /// carries no end cursor.
    pub fn advance(self, page: &PageInfo) -> Result<Self, SyncError> {
        Ok(Self {
            after: Some(end_cursor(page)?),
        })
    }

    /// A members cursor at the first member page of teams on this page.
    pub fn members(&self) -> MembersCursor<'_> {
        MembersCursor {
            teams: self,
            after: None,
        }
    }

    pub fn request(&self) -> PageRequest {
        PageRequest {
            teams_after: self.after.clone(),
            members_after: None,
        }
    }
}

/// Position within the member collection of teams on one team page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembersCursor<'a> {
    teams: &'a TeamsCursor,
    after: Option<String>,
}

impl MembersCursor<'_> {
    pub fn advance(self, page: &PageInfo) -> Result<Self, SyncError> {
        Ok(Self {
            teams: self.teams,
            after: Some(end_cursor(page)?),
        })
    }

    pub fn request(&self) -> PageRequest {
        PageRequest {
            teams_after: self.teams.after.clone(),
            members_after: self.after.clone(),
        }
    }
}

fn end_cursor(page: &PageInfo) -> Result<String, SyncError> {
    page.end_cursor.clone().ok_or_else(|| {
        SyncError::Fetch(GitHubError::ParseError(
            "page reports more results but has no end cursor".into(),
        ))
    })
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Fetch every team of `organization` together with all of its members.
///
/// Any failed page query aborts the whole fetch.
pub async fn fetch_snapshot<A>(api: &A, organization: &str) -> Result<RemoteSnapshot, SyncError>
where
    A: TeamsApi + ?Sized,
{
    let mut teams = Vec::new();
    let mut cursor = TeamsCursor::start();
    let mut pages = 0usize;

    loop {
        let page = api
            .query_teams(organization, &cursor.request())
            .await
            .map_err(SyncError::Fetch)?;
        pages += 1;
        debug!(page = pages, teams = page.nodes.len(), "received team page");

        for node in &page.nodes {
            teams.push(collect_members(api, organization, &cursor, node).await?);
        }

        if !page.page_info.has_next_page {
            break;
        }
        cursor = cursor.advance(&page.page_info)?;
    }

    info!(organization, teams = teams.len(), pages, "fetched remote teams");
    Ok(RemoteSnapshot {
        organization: organization.to_string(),
        teams,
    })
}

/// Page through the remaining members of `node`, which was received on the
/// team page addressed by `teams_cursor`.
async fn collect_members<A>(
    api: &A,
    organization: &str,
    teams_cursor: &TeamsCursor,
    node: &TeamNode,
) -> Result<TeamNode, SyncError>
where
    A: TeamsApi + ?Sized,
{
    let mut team = node.clone();
    let mut page_info = node.members.page_info.clone();
    let mut cursor = teams_cursor.members();

    while page_info.has_next_page {
        cursor = cursor.advance(&page_info)?;
        let page = api
            .query_teams(organization, &cursor.request())
            .await
            .map_err(SyncError::Fetch)?;
        let requeried = page
            .team_with_id(&node.id)
            .ok_or_else(|| SyncError::TeamVanished(node.id.clone()))?;
        team.members
            .nodes
            .extend(requeried.members.nodes.iter().cloned());
        page_info = requeried.members.page_info.clone();
        debug!(team = %node.name, members = team.members.nodes.len(), "received member page");
    }

    team.members.page_info = PageInfo::default();
    Ok(team)
}

/// Look up each slug remotely and add the team to `org` under its remote
/// name and ID. Returns the names of the added teams.
pub async fn add_remote_teams<A>(
    api: &A,
    org: &mut Organization,
    slugs: &[String],
) -> Result<Vec<String>, CoreError>
where
    A: TeamsApi + ?Sized,
{
    let mut added = Vec::with_capacity(slugs.len());
    for team_slug in slugs {
        let team = api
            .get_team_by_slug(&org.organization, &slug(team_slug))
            .await?;
        org.add_team(&team.name, &team.node_id)?;
        info!(team = %team.name, slug = %team.slug, "added team from remote");
        added.push(team.name);
    }
    Ok(added)
}
