//! Error types for the teamsync core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

// ---------------------------------------------------------------------------
// GitHub API errors
// ---------------------------------------------------------------------------

/// Errors from GitHub REST and GraphQL interactions.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// HTTP-level transport error (network, TLS, etc.).
    #[error("GitHub HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("GitHub API error (HTTP {status}): {body}")]
    ApiError {
        status: u16,
        body: String,
    },

    /// Authentication token is missing or invalid.
    #[error("GitHub authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Rate limit exceeded.
    #[error("GitHub rate limit exceeded, resets at {reset_at}")]
    RateLimited {
        reset_at: String,
    },

    /// The GraphQL endpoint answered with an `errors` array.
    #[error("GitHub GraphQL error: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    /// The queried organization does not exist or is not visible.
    #[error("GitHub organization '{0}' not found")]
    OrganizationNotFound(String),

    /// JSON deserialization failure.
    #[error("GitHub response parse error: {0}")]
    ParseError(String),
}

// ---------------------------------------------------------------------------
// Reconciliation errors
// ---------------------------------------------------------------------------

/// Errors that abort a reconciliation run.
///
/// Per-team mutation failures are not represented here: they are reported
/// to the operator and recorded in the run report instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A page of the remote snapshot could not be fetched.
    #[error("failed to fetch remote teams: {0}")]
    Fetch(#[source] GitHubError),

    /// A team vanished from the query result while its members were being
    /// paged through.
    #[error("team with id '{0}' not found while paging through its members")]
    TeamVanished(String),

    /// The confirmation prompt could not be shown or answered.
    #[error("confirmation prompt failed: {0}")]
    Prompt(String),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A required environment variable is not set.
    #[error("required environment variable '{var}' is not set (referenced by config field '{field}')")]
    EnvVarMissing {
        var: String,
        field: String,
    },

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue {
        field: String,
        detail: String,
    },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Local state errors
// ---------------------------------------------------------------------------

/// Errors from loading or storing the local organization file.
#[derive(Debug, Error)]
pub enum StateError {
    /// The state file does not exist.
    #[error("organization state file not found: {0}")]
    NotFound(String),

    /// The state file is not valid TOML for an organization.
    #[error("organization state parse error in '{path}': {detail}")]
    ParseError {
        path: String,
        detail: String,
    },

    /// The organization could not be serialized.
    #[error("organization state serialize error: {0}")]
    SerializeError(String),

    /// Generic I/O error.
    #[error("organization state I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Lookup errors
// ---------------------------------------------------------------------------

/// Non-fatal lookup failures: a referenced team or login does not exist.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// No team with this name exists in the local organization.
    #[error("unknown team '{0}'")]
    UnknownTeam(String),

    /// A team with this name already exists in the local organization.
    #[error("team '{0}' already exists")]
    DuplicateTeam(String),

    /// A per-team exclusion references a login missing from the directory.
    #[error("user '{login}' from team '{team}' not found in the organization member directory")]
    UnknownExcludedMember {
        team: String,
        login: String,
    },

    /// Logins that could not be found in the member directory.
    #[error("users not found in the organization member directory: {}", .0.join(", "))]
    UnknownMembers(Vec<String>),

    /// The team has no remote ID and cannot be addressed remotely.
    #[error("team '{0}' has no remote id")]
    MissingTeamId(String),
}

// CoreError implements `std::error::Error` via `thiserror`, which means
// `anyhow::Error: From<CoreError>` is already provided by the blanket impl
// in `anyhow`.
