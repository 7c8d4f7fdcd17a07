//! Interactive terminal operator.

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use dialoguer::Confirm;

use teamsync_core::errors::SyncError;
use teamsync_core::reconcile::{DiffReport, SyncReport};
use teamsync_core::Operator;

use crate::style;

/// Prints to stdout/stderr and asks confirmations on the terminal.
pub struct TerminalOperator;

impl Operator for TerminalOperator {
    fn notice(&self, message: &str) {
        println!("{}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("{}", style::error(message));
    }

    fn confirm(&self, prompt: &str) -> Result<bool, SyncError> {
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| SyncError::Prompt(e.to_string()))
    }

    fn present_changes(&self, diff: &DiffReport) {
        println!("{}", style::header("Going to submit the following changes:"));
        println!("{}", changes_table(diff));
    }
}

/// Render pending membership changes, one row per team.
pub fn changes_table(diff: &DiffReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Team", "Adding", "Removing"]);

    for (team, change) in &diff.changes {
        let adding: Vec<String> = change.to_add.iter().map(|l| style::added(l)).collect();
        let removing: Vec<String> = change.to_remove.iter().map(|l| style::removed(l)).collect();
        table.add_row(vec![
            Cell::new(team),
            Cell::new(adding.join(" ")),
            Cell::new(removing.join(" ")),
        ]);
    }
    table
}

/// Print the closing summary of a sync run.
pub fn print_report(report: &SyncReport) {
    let (updated, submitted) = if report.dry_run {
        ("would be updated", "would be submitted")
    } else {
        ("updated", "submitted")
    };
    println!();
    println!("{}", style::header("Summary"));

    if report.membership_confirmed {
        println!(
            "{}",
            style::success(&format!(
                "{} team(s) {}",
                report.membership_applied.len(),
                updated
            ))
        );
    }
    for failure in &report.membership_failed {
        println!(
            "{}",
            style::error(&format!("{}: {}", failure.team, failure.message))
        );
    }

    if report.policy_confirmed {
        println!(
            "{}",
            style::success(&format!(
                "{} review assignment(s) {}",
                report.policy_updated.len(),
                submitted
            ))
        );
    }
    for failure in &report.policy_failed {
        println!(
            "{}",
            style::error(&format!("{}: {}", failure.team, failure.message))
        );
    }
    if !report.unresolved.is_empty() {
        println!(
            "{}",
            style::warn(&format!(
                "{} exclusion(s) could not be resolved",
                report.unresolved.len()
            ))
        );
    }
}
