//! Reconciliation of a local organization layout with GitHub.
//!
//! A run flows through these stages:
//!
//! 1. [`fetch`] pages through every remote team and member.
//! 2. [`projector`] turns the fetched records into an [`Organization`].
//! 3. [`diff`] compares each local team with its remote namesake.
//! 4. [`exclusion`] resolves review-assignment exclusions to member IDs.
//! 5. [`executor`] confirms and applies membership and policy changes.
//!
//! [`Organization`]: crate::models::Organization

pub mod diff;
pub mod exclusion;
pub mod executor;
pub mod fetch;
pub mod projector;

pub use diff::{
    apply_change, compare_teams, diff_organization, ComparisonMask, DiffReport, FieldDiff,
    PendingChange, TeamField,
};
pub use exclusion::{resolve_excluded_members, ExclusionResolution};
pub use executor::{ExecutionMode, Reconciler, SyncOutcome, SyncReport, TeamFailure};
pub use fetch::{add_remote_teams, fetch_snapshot, MembersCursor, RemoteSnapshot, TeamsCursor};
pub use projector::project;
