//! Shared fixtures: an in-memory GitHub organization and a scripted operator.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use teamsync_core::errors::{GitHubError, SyncError};
use teamsync_core::github::{
    slug, MemberNode, MembersPage, PageInfo, PageRequest, RemoteTeam, ReviewAssignmentUpdate,
    TeamNode, TeamsApi, TeamsPage,
};
use teamsync_core::models::{ExcludedMember, Member, Organization, Team};
use teamsync_core::Operator;

// ===========================================================================
// Fake GitHub
// ===========================================================================

#[derive(Debug, Clone)]
pub struct FakeTeam {
    pub id: String,
    pub name: String,
    pub delegation_enabled: bool,
    pub members: Vec<String>,
}

impl FakeTeam {
    pub fn new(id: &str, name: &str, members: &[&str]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            delegation_enabled: false,
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Add { team: String, login: String },
    Remove { team: String, login: String },
    Policy(ReviewAssignmentUpdate),
}

/// In-memory organization served with cursor pagination. Cursors are
/// `t<offset>` for teams and `m<offset>` for members.
pub struct FakeGitHub {
    pub page_size: usize,
    pub teams: Vec<FakeTeam>,
    pub calls: Mutex<Vec<Call>>,
    pub queries: Mutex<Vec<PageRequest>>,
    /// Team slugs whose membership calls fail.
    pub failing_teams: HashSet<String>,
    /// Team IDs whose policy update fails.
    pub failing_policies: HashSet<String>,
    /// Fail the n-th (0-based) page query.
    pub fail_query_at: Option<usize>,
    /// Omit every team from member re-queries.
    pub drop_teams_on_requery: bool,
}

impl FakeGitHub {
    pub fn new(page_size: usize, teams: Vec<FakeTeam>) -> Self {
        Self {
            page_size,
            teams,
            calls: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            failing_teams: HashSet::new(),
            failing_policies: HashSet::new(),
            fail_query_at: None,
            drop_teams_on_requery: false,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn membership_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Policy(_)))
            .collect()
    }

    pub fn policy_calls(&self) -> Vec<ReviewAssignmentUpdate> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Policy(update) => Some(update),
                _ => None,
            })
            .collect()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    fn page_info(&self, end: usize, total: usize, prefix: char) -> PageInfo {
        PageInfo {
            end_cursor: Some(format!("{prefix}{end}")),
            has_next_page: end < total,
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn offset(cursor: &Option<String>) -> usize {
    cursor
        .as_deref()
        .map(|c| c[1..].parse().unwrap())
        .unwrap_or(0)
}

pub fn member_id(login: &str) -> String {
    format!("U_{login}")
}

#[async_trait]
impl TeamsApi for FakeGitHub {
    async fn query_teams(
        &self,
        _organization: &str,
        request: &PageRequest,
    ) -> Result<TeamsPage, GitHubError> {
        let n = {
            let mut queries = self.queries.lock().unwrap();
            queries.push(request.clone());
            queries.len() - 1
        };
        if self.fail_query_at == Some(n) {
            return Err(GitHubError::ApiError {
                status: 502,
                body: "bad gateway".into(),
            });
        }
        if self.drop_teams_on_requery && request.members_after.is_some() {
            return Ok(TeamsPage::default());
        }

        let t_start = offset(&request.teams_after).min(self.teams.len());
        let t_end = (t_start + self.page_size).min(self.teams.len());
        let m_start = offset(&request.members_after);

        let nodes = self.teams[t_start..t_end]
            .iter()
            .map(|team| {
                let from = m_start.min(team.members.len());
                let to = (from + self.page_size).min(team.members.len());
                TeamNode {
                    id: team.id.clone(),
                    name: team.name.clone(),
                    review_request_delegation_enabled: team.delegation_enabled,
                    review_request_delegation_algorithm: team
                        .delegation_enabled
                        .then(|| "ROUND_ROBIN".to_string()),
                    review_request_delegation_member_count: team.delegation_enabled.then_some(1),
                    members: MembersPage {
                        nodes: team.members[from..to]
                            .iter()
                            .map(|login| MemberNode {
                                id: member_id(login),
                                login: login.clone(),
                                name: Some(login.to_uppercase()),
                            })
                            .collect(),
                        page_info: self.page_info(to, team.members.len(), 'm'),
                    },
                    ..Default::default()
                }
            })
            .collect();

        Ok(TeamsPage {
            nodes,
            page_info: self.page_info(t_end, self.teams.len(), 't'),
        })
    }

    async fn add_team_member(
        &self,
        _organization: &str,
        team_slug: &str,
        login: &str,
    ) -> Result<(), GitHubError> {
        if self.failing_teams.contains(team_slug) {
            return Err(GitHubError::AuthenticationFailed("HTTP 403 Forbidden".into()));
        }
        self.record(Call::Add {
            team: team_slug.into(),
            login: login.into(),
        });
        Ok(())
    }

    async fn remove_team_member(
        &self,
        _organization: &str,
        team_slug: &str,
        login: &str,
    ) -> Result<(), GitHubError> {
        if self.failing_teams.contains(team_slug) {
            return Err(GitHubError::AuthenticationFailed("HTTP 403 Forbidden".into()));
        }
        self.record(Call::Remove {
            team: team_slug.into(),
            login: login.into(),
        });
        Ok(())
    }

    async fn update_review_assignment(
        &self,
        update: &ReviewAssignmentUpdate,
    ) -> Result<(), GitHubError> {
        if self.failing_policies.contains(&update.team_id) {
            return Err(GitHubError::GraphQl(vec!["team not found".into()]));
        }
        self.record(Call::Policy(update.clone()));
        Ok(())
    }

    async fn get_team_by_slug(
        &self,
        _organization: &str,
        team_slug: &str,
    ) -> Result<RemoteTeam, GitHubError> {
        self.teams
            .iter()
            .enumerate()
            .find(|(_, t)| slug(&t.name) == team_slug)
            .map(|(i, t)| RemoteTeam {
                id: i as u64 + 1,
                node_id: t.id.clone(),
                name: t.name.clone(),
                slug: slug(&t.name),
            })
            .ok_or_else(|| GitHubError::ApiError {
                status: 404,
                body: "Not Found".into(),
            })
    }
}

// ===========================================================================
// Scripted operator
// ===========================================================================

/// Answers prompts from a script and records everything shown.
#[derive(Default)]
pub struct ScriptedOperator {
    answers: Mutex<VecDeque<bool>>,
    pub prompts: Mutex<Vec<String>>,
    pub notices: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl ScriptedOperator {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            ..Default::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Operator for ScriptedOperator {
    fn notice(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn confirm(&self, prompt: &str) -> Result<bool, SyncError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| SyncError::Prompt("no scripted answer".into()))
    }
}

// ===========================================================================
// Local organization builders
// ===========================================================================

pub fn local_org(teams: &[(&str, &str, &[&str])], directory: &[&str]) -> Organization {
    let mut org = Organization::new("acme");
    for login in directory {
        org.members.insert(
            login.to_string(),
            Member {
                id: member_id(login),
                name: login.to_uppercase(),
            },
        );
    }
    for (name, id, members) in teams {
        org.teams.insert(
            name.to_string(),
            Team {
                id: id.to_string(),
                members: members.iter().map(|m| m.to_string()).collect(),
                ..Default::default()
            },
        );
    }
    org
}

pub fn exclude(org: &mut Organization, team: &str, login: &str) {
    org.teams
        .get_mut(team)
        .unwrap()
        .review_assignment
        .excluded_members
        .push(ExcludedMember::new(login));
}
