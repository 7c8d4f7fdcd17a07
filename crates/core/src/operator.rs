//! The human driving a reconciliation run.
//!
//! The engine never writes to the terminal itself: change summaries,
//! progress lines and per-team failures go to an [`Operator`], which also
//! answers confirmation prompts.

use crate::errors::SyncError;
use crate::reconcile::DiffReport;

pub trait Operator: Send + Sync {
    /// Show a progress or informational message.
    fn notice(&self, message: &str);

    /// Show a non-fatal failure.
    fn error(&self, message: &str);

    /// Ask a yes/no question.
    fn confirm(&self, prompt: &str) -> Result<bool, SyncError>;

    /// Show the membership changes about to be applied.
    fn present_changes(&self, diff: &DiffReport) {
        self.notice("Going to submit the following changes:");
        self.notice(diff.summary().trim_end());
    }
}
