//! teamsync core library.
//!
//! Reconciles a declarative description of an organization's teams (members
//! and review assignment policy) with the live state on GitHub: fetch the
//! remote teams page by page, diff them against the local layout, and apply
//! the minimal membership and policy changes.

pub mod config;
pub mod errors;
pub mod github;
pub mod models;
pub mod operator;
pub mod reconcile;
pub mod state;

// Re-exports for convenience.
pub use config::AppConfig;
pub use github::{GitHubClient, TeamsApi};
pub use models::Organization;
pub use operator::Operator;
pub use reconcile::{ExecutionMode, Reconciler};
