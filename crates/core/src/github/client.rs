//! GitHub REST + GraphQL client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use super::query::{
    GraphQlResponse, PageRequest, RemoteTeam, ReviewAssignmentUpdate, TeamsPage, TeamsQueryData,
    TEAMS_QUERY, UPDATE_REVIEW_ASSIGNMENT_MUTATION,
};
use super::TeamsApi;
use crate::config::AppConfig;
use crate::errors::{ConfigError, GitHubError};

/// Asynchronous GitHub API client.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    graphql_url: String,
    token: String,
    page_size: u32,
}

impl GitHubClient {
    pub fn new(
        api_url: impl Into<String>,
        graphql_url: impl Into<String>,
        token: impl Into<String>,
        page_size: u32,
    ) -> Result<Self, GitHubError> {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        let graphql_url = graphql_url.into();
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("teamsync/0.1"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        info!(api_url = %api_url, graphql_url = %graphql_url, "created GitHubClient");
        Ok(Self {
            http,
            api_url,
            graphql_url,
            token: token.into(),
            page_size,
        })
    }

    /// Build a client from a resolved [`AppConfig`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let token = config.github.require_token()?;
        Self::new(
            config.github.api_url.clone(),
            config.github.graphql_endpoint(),
            token,
            config.sync.page_size,
        )
        .map_err(|e| ConfigError::InvalidValue {
            field: "github".into(),
            detail: e.to_string(),
        })
    }

    fn membership_url(&self, organization: &str, team_slug: &str, login: &str) -> String {
        format!(
            "{}/orgs/{}/teams/{}/memberships/{}",
            self.api_url, organization, team_slug, login
        )
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, GitHubError> {
        let body = serde_json::json!({ "query": query, "variables": variables });
        let resp = self
            .http
            .post(&self.graphql_url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        let resp = check_response(resp).await?;
        let payload: GraphQlResponse<T> = resp
            .json()
            .await
            .map_err(|e| GitHubError::ParseError(e.to_string()))?;
        if !payload.errors.is_empty() {
            return Err(GitHubError::GraphQl(
                payload.errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        payload
            .data
            .ok_or_else(|| GitHubError::ParseError("GraphQL response has no data".into()))
    }
}

#[async_trait]
impl TeamsApi for GitHubClient {
    #[instrument(skip(self))]
    async fn query_teams(
        &self,
        organization: &str,
        request: &PageRequest,
    ) -> Result<TeamsPage, GitHubError> {
        let variables = serde_json::json!({
            "owner": organization,
            "pageSize": self.page_size,
            "teamsCursor": request.teams_after,
            "membersCursor": request.members_after,
        });
        let data: TeamsQueryData = self.graphql(TEAMS_QUERY, variables).await?;
        let teams = data
            .organization
            .ok_or_else(|| GitHubError::OrganizationNotFound(organization.to_string()))?
            .teams;
        debug!(
            count = teams.nodes.len(),
            has_next_page = teams.page_info.has_next_page,
            "fetched teams page"
        );
        Ok(teams)
    }

    #[instrument(skip(self))]
    async fn add_team_member(
        &self,
        organization: &str,
        team_slug: &str,
        login: &str,
    ) -> Result<(), GitHubError> {
        let url = self.membership_url(organization, team_slug, login);
        let payload = serde_json::json!({ "role": "member" });
        let resp = self
            .http
            .put(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;
        check_response(resp).await?;
        info!(team_slug, login, "added team member");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_team_member(
        &self,
        organization: &str,
        team_slug: &str,
        login: &str,
    ) -> Result<(), GitHubError> {
        let url = self.membership_url(organization, team_slug, login);
        let resp = self
            .http
            .delete(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        check_response(resp).await?;
        info!(team_slug, login, "removed team member");
        Ok(())
    }

    #[instrument(skip(self, update), fields(team_id = %update.team_id))]
    async fn update_review_assignment(
        &self,
        update: &ReviewAssignmentUpdate,
    ) -> Result<(), GitHubError> {
        let variables = serde_json::json!({ "input": update });
        let _: serde_json::Value = self
            .graphql(UPDATE_REVIEW_ASSIGNMENT_MUTATION, variables)
            .await?;
        info!(
            excluded = update.excluded_member_ids.len(),
            "updated review assignment"
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_team_by_slug(
        &self,
        organization: &str,
        team_slug: &str,
    ) -> Result<RemoteTeam, GitHubError> {
        let url = format!("{}/orgs/{}/teams/{}", self.api_url, organization, team_slug);
        let resp = self.http.get(&url).bearer_auth(&self.token).send().await?;
        let resp = check_response(resp).await?;
        let team: RemoteTeam = resp
            .json()
            .await
            .map_err(|e| GitHubError::ParseError(e.to_string()))?;
        debug!(name = %team.name, node_id = %team.node_id, "fetched team");
        Ok(team)
    }
}

/// Map non-success statuses to [`GitHubError`], passing successful
/// responses through.
async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, GitHubError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    match status.as_u16() {
        401 => {
            return Err(GitHubError::AuthenticationFailed(format!("HTTP {}", status)));
        }
        403 | 429 => {
            if let Some(reset_at) = rate_limit_reset(resp.headers(), status) {
                return Err(GitHubError::RateLimited { reset_at });
            }
            return Err(GitHubError::AuthenticationFailed(format!("HTTP {}", status)));
        }
        _ => {}
    }
    let body = resp
        .text()
        .await
        .unwrap_or_else(|_| format!("HTTP {}", status));
    Err(GitHubError::ApiError {
        status: status.as_u16(),
        body,
    })
}

/// The reset time of an exhausted rate limit, if the response reports one.
fn rate_limit_reset(headers: &HeaderMap, status: StatusCode) -> Option<String> {
    let exhausted = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "0")
        .unwrap_or(false);
    if !exhausted && status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }
    Some(
        headers
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = GitHubClient::new(
            "https://api.github.com/",
            "https://api.github.com/graphql",
            "token",
            100,
        )
        .unwrap();
        assert_eq!(
            client.membership_url("acme", "ops", "alice"),
            "https://api.github.com/orgs/acme/teams/ops/memberships/alice"
        );
    }

    #[test]
    fn test_from_config_requires_token() {
        let config: AppConfig = toml::from_str(
            r#"
[github]
organization = "acme"
token_env = "TEAMSYNC_CLIENT_TEST_UNSET"
"#,
        )
        .unwrap();
        let result = GitHubClient::from_config(&config);
        assert!(matches!(result, Err(ConfigError::EnvVarMissing { .. })));
    }

    #[test]
    fn test_rate_limit_reset_when_exhausted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1700000000"));
        assert_eq!(
            rate_limit_reset(&headers, StatusCode::FORBIDDEN).as_deref(),
            Some("1700000000")
        );
    }

    #[test]
    fn test_forbidden_with_quota_left_is_not_rate_limited() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("42"));
        assert_eq!(rate_limit_reset(&headers, StatusCode::FORBIDDEN), None);
    }

    #[test]
    fn test_too_many_requests_without_headers() {
        assert_eq!(
            rate_limit_reset(&HeaderMap::new(), StatusCode::TOO_MANY_REQUESTS).as_deref(),
            Some("unknown")
        );
    }
}
