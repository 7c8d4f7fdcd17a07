//! TOML-based configuration for teamsync.
//!
//! The GitHub token is never stored in the file: the `token_env` field names
//! the environment variable holding it, and [`AppConfig::resolve_env_vars`]
//! resolves it at runtime.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::ConfigError;

/// Largest page GitHub's GraphQL API will return for a connection.
pub const MAX_PAGE_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level application configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// GitHub organization and API settings.
    pub github: GitHubConfig,

    /// Where the local organization layout lives.
    #[serde(default)]
    pub state: StateConfig,

    /// Reconciliation behaviour.
    #[serde(default)]
    pub sync: SyncConfig,
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

/// GitHub organization and API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// GitHub REST API base URL (default `https://api.github.com`).
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    /// GraphQL endpoint. Defaults to `{api_url}/graphql`.
    #[serde(default)]
    pub graphql_url: Option<String>,

    /// Organization login whose teams are managed.
    pub organization: String,

    /// Environment variable holding the GitHub token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Resolved token (populated by `resolve_env_vars`).
    #[serde(skip)]
    pub token: Option<String>,
}

fn default_github_api_url() -> String {
    "https://api.github.com".into()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".into()
}

impl GitHubConfig {
    /// The GraphQL endpoint, derived from `api_url` when not set.
    pub fn graphql_endpoint(&self) -> String {
        match &self.graphql_url {
            Some(url) => url.clone(),
            None => format!("{}/graphql", self.api_url.trim_end_matches('/')),
        }
    }

    /// The resolved token, or an error naming the variable to set.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.token
            .as_deref()
            .ok_or_else(|| ConfigError::EnvVarMissing {
                var: self.token_env.clone(),
                field: "github.token_env".into(),
            })
    }
}

// ---------------------------------------------------------------------------
// Local state
// ---------------------------------------------------------------------------

/// Location of the local organization file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Path to the TOML organization layout (default `team-assignments.toml`).
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

fn default_state_path() -> PathBuf {
    PathBuf::from("team-assignments.toml")
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sync behaviour
// ---------------------------------------------------------------------------

/// Reconciliation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Number of teams, and of members per team, requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & resolving
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load an [`AppConfig`] from a TOML file at the given path.
    ///
    /// This does **not** resolve environment variables -- call
    /// [`resolve_env_vars`](Self::resolve_env_vars) afterwards.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Resolve the token from its environment variable.
    ///
    /// A missing variable only logs a warning; commands that reach the
    /// remote call [`GitHubConfig::require_token`].
    pub fn resolve_env_vars(&mut self) -> Result<(), ConfigError> {
        self.github.token = resolve_optional_env(&self.github.token_env, "github.token_env");
        Ok(())
    }

    /// Validate that all required fields are present and sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.github.organization.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "github.organization".into(),
                detail: "organization must not be empty".into(),
            });
        }
        if self.github.api_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "github.api_url".into(),
                detail: "API URL must not be empty".into(),
            });
        }
        if self.sync.page_size == 0 || self.sync.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "sync.page_size".into(),
                detail: format!("page size must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }
        if self.state.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "state.path".into(),
                detail: "state path must not be empty".into(),
            });
        }

        Ok(())
    }

    /// Convenience: load, resolve, and validate in one call.
    pub fn load_and_resolve<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.resolve_env_vars()?;
        config.validate()?;
        Ok(config)
    }
}

/// Try to read an environment variable by name. Returns `Some(value)` on
/// success; logs a warning and returns `None` if the variable is unset.
fn resolve_optional_env(env_name: &str, field: &str) -> Option<String> {
    match std::env::var(env_name) {
        Ok(val) if !val.is_empty() => {
            debug!(field, env_name, "resolved env var");
            Some(val)
        }
        Ok(_) => {
            warn!(field, env_name, "env var is set but empty");
            None
        }
        Err(_) => {
            warn!(field, env_name, "env var not set");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_toml() -> &'static str {
        r#"
[github]
api_url = "https://github.example.com/api/v3"
organization = "acme"
token_env = "ACME_TOKEN"

[state]
path = "/srv/teams/acme.toml"

[sync]
page_size = 50
"#
    }

    #[test]
    fn test_parse_full_config() {
        let config: AppConfig = toml::from_str(sample_toml()).expect("failed to parse toml");
        assert_eq!(config.github.organization, "acme");
        assert_eq!(config.github.token_env, "ACME_TOKEN");
        assert_eq!(config.state.path, PathBuf::from("/srv/teams/acme.toml"));
        assert_eq!(config.sync.page_size, 50);
        assert_eq!(
            config.github.graphql_endpoint(),
            "https://github.example.com/api/v3/graphql"
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_toml().as_bytes()).unwrap();

        let config = AppConfig::load_from_file(&path).expect("load_from_file failed");
        assert_eq!(config.github.organization, "acme");
    }

    #[test]
    fn test_file_not_found() {
        let result = AppConfig::load_from_file("/nonexistent/config.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_validate_rejects_empty_organization() {
        let mut config: AppConfig = toml::from_str(sample_toml()).unwrap();
        config.github.organization = String::new();
        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "github.organization"
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_page() {
        let mut config: AppConfig = toml::from_str(sample_toml()).unwrap();
        config.sync.page_size = 101;
        let result = config.validate();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "sync.page_size"
        ));

        config.sync.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_env_vars() {
        std::env::set_var("TEAMSYNC_TEST_TOKEN", "ghp_abc");

        let toml_str = r#"
[github]
organization = "acme"
token_env = "TEAMSYNC_TEST_TOKEN"
"#;
        let mut config: AppConfig = toml::from_str(toml_str).unwrap();
        config.resolve_env_vars().unwrap();
        assert_eq!(config.github.require_token().unwrap(), "ghp_abc");

        std::env::remove_var("TEAMSYNC_TEST_TOKEN");
    }

    #[test]
    fn test_require_token_names_variable() {
        let toml_str = r#"
[github]
organization = "acme"
token_env = "TEAMSYNC_TEST_UNSET_TOKEN"
"#;
        let mut config: AppConfig = toml::from_str(toml_str).unwrap();
        config.resolve_env_vars().unwrap();
        let err = config.github.require_token().unwrap_err();
        assert!(err.to_string().contains("TEAMSYNC_TEST_UNSET_TOKEN"));
    }

    #[test]
    fn test_defaults() {
        let minimal = r#"
[github]
organization = "acme"
"#;
        let config: AppConfig = toml::from_str(minimal).unwrap();
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.github.token_env, "GITHUB_TOKEN");
        assert_eq!(
            config.github.graphql_endpoint(),
            "https://api.github.com/graphql"
        );
        assert_eq!(config.state.path, PathBuf::from("team-assignments.toml"));
        assert_eq!(config.sync.page_size, 100);
        assert!(config.validate().is_ok());
    }
}
