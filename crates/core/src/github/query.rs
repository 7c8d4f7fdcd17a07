//! Wire types for the GitHub GraphQL and REST endpoints used by teamsync.

use serde::{Deserialize, Serialize};

use crate::models::ReviewAlgorithm;

/// Paginated query over an organization's teams and, nested inside each
/// team, its members.
///
/// `$membersCursor` applies to every team on the page; it is only non-null
/// while re-querying a single team's later member pages.
pub const TEAMS_QUERY: &str = r#"
query($owner: String!, $pageSize: Int!, $teamsCursor: String, $membersCursor: String) {
  organization(login: $owner) {
    teams(first: $pageSize, after: $teamsCursor) {
      nodes {
        id
        databaseId
        name
        reviewRequestDelegationEnabled
        reviewRequestDelegationAlgorithm
        reviewRequestDelegationMemberCount
        reviewRequestDelegationNotifyTeam
        members(first: $pageSize, after: $membersCursor) {
          nodes {
            id
            login
            name
          }
          pageInfo {
            endCursor
            hasNextPage
          }
        }
      }
      pageInfo {
        endCursor
        hasNextPage
      }
    }
  }
}
"#;

pub const UPDATE_REVIEW_ASSIGNMENT_MUTATION: &str = r#"
mutation($input: UpdateTeamReviewAssignmentInput!) {
  updateTeamReviewAssignment(input: $input) {
    team {
      id
    }
  }
}
"#;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Cursor pair sent with one page query. `None` requests the first page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub teams_after: Option<String>,
    pub members_after: Option<String>,
}

/// Input of the `updateTeamReviewAssignment` mutation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAssignmentUpdate {
    #[serde(rename = "id")]
    pub team_id: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<ReviewAlgorithm>,
    pub notify_team: bool,
    #[serde(rename = "teamMemberCount")]
    pub member_count: u32,
    #[serde(rename = "excludedTeamMemberIds")]
    pub excluded_member_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Connection pagination state as reported by GraphQL.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub end_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// One page of teams.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamsPage {
    #[serde(default)]
    pub nodes: Vec<TeamNode>,
    #[serde(default)]
    pub page_info: PageInfo,
}

impl TeamsPage {
    /// Find a team on this page by its node ID.
    pub fn team_with_id(&self, id: &str) -> Option<&TeamNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

/// A team record together with one page of its members.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamNode {
    pub id: String,
    #[serde(default)]
    pub database_id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub review_request_delegation_enabled: bool,
    #[serde(default)]
    pub review_request_delegation_algorithm: Option<String>,
    #[serde(default)]
    pub review_request_delegation_member_count: Option<u32>,
    #[serde(default)]
    pub review_request_delegation_notify_team: bool,
    #[serde(default)]
    pub members: MembersPage,
}

/// One page of a team's members.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MembersPage {
    #[serde(default)]
    pub nodes: Vec<MemberNode>,
    #[serde(default)]
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberNode {
    pub id: String,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Team as returned by `GET /orgs/{org}/teams/{slug}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteTeam {
    pub id: u64,
    pub node_id: String,
    pub name: String,
    pub slug: String,
}

// -- GraphQL envelope ---------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlErrorMessage {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TeamsQueryData {
    pub organization: Option<OrganizationNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrganizationNode {
    pub teams: TeamsPage,
}
