//! Human rendering of the reconcile report.

use std::fmt::Write as _;

use comfy_table::Cell;
use serde::Serialize;

use super::colors::{colorize_percent, format_percent};
use super::table::{list_table, render_list};
use super::{action_failure, action_success, CommandOutput};
use crate::application::{LoopOutcome, ReconcileReport, RunMode, StallReason};
use crate::services::numeric_codec::format_cost;
use crate::services::statistics::{BudgetStatistics, PercentRange};

/// Output of the reconcile command.
#[derive(Debug, Serialize)]
pub struct ReconcileOutput {
    #[serde(flatten)]
    pub report: ReconcileReport,
    #[serde(skip)]
    pub literal_name: String,
}

impl ReconcileOutput {
    pub fn new(report: ReconcileReport, literal_name: impl Into<String>) -> Self {
        Self {
            report,
            literal_name: literal_name.into(),
        }
    }
}

fn describe_outcome(outcome: LoopOutcome) -> &'static str {
    match outcome {
        LoopOutcome::Converged => "converged",
        LoopOutcome::Stalled {
            reason: StallReason::NonBudgetFailure,
        } => "stalled: failures are not budget-related",
        LoopOutcome::Stalled {
            reason: StallReason::FormatDrift,
        } => "stalled: mismatches found but no file changed (unrecognised literal format?)",
        LoopOutcome::Exhausted => "did not converge within the iteration cap",
    }
}

fn range_line(label: &str, range: &PercentRange) -> String {
    format!(
        "    {label:<8} avg {}  range [{}, {}]",
        format_percent(range.average, 2),
        format_percent(range.min, 2),
        format_percent(range.max, 2)
    )
}

/// Render the statistics block.
pub fn render_statistics(stats: &BudgetStatistics, literal_name: &str) -> String {
    if stats.is_empty() {
        return "  No budget changes detected.".to_string();
    }

    let mut lines = vec![
        format!("  {literal_name} changes: {}", stats.total),
        format!("    Decreases (improvements): {}", stats.improvements),
    ];
    if stats.regressions > 0 {
        lines.push(format!(
            "    Increases ({}):   {}",
            console::style("REGRESSIONS").red().bold(),
            stats.regressions
        ));
    }
    if let Some(memory) = &stats.memory {
        lines.push(range_line("Memory:", memory));
    }
    if let Some(steps) = &stats.steps {
        lines.push(range_line("Steps:", steps));
    }

    if !stats.sizes.is_empty() {
        let mut table = list_table(&["File", "Line", "Old", "New", "Change"]);
        for size in &stats.sizes {
            table.add_row(vec![
                Cell::new(&size.file_name),
                Cell::new(size.line),
                Cell::new(size.old),
                Cell::new(size.new),
                Cell::new(colorize_percent(size.percent, 1)),
            ]);
        }
        lines.push(String::new());
        lines.push(render_list("size change", &table, stats.sizes.len()));
    }

    if !stats.regressed.is_empty() {
        lines.push(String::new());
        lines.push("  Regressions:".to_string());
        for entry in &stats.regressed {
            lines.push(format!(
                "    {} -> {}  (mem {}, steps {})",
                format_cost(literal_name, entry.old),
                format_cost(literal_name, entry.new),
                colorize_percent(entry.memory_percent, 3),
                colorize_percent(entry.steps_percent, 3)
            ));
        }
    }

    lines.join("\n")
}

impl CommandOutput for ReconcileOutput {
    fn to_human(&self) -> String {
        let report = &self.report;
        let mut out = String::new();

        if let Some(primary) = &report.primary {
            let _ = writeln!(
                out,
                "Fix loop: {} after {} iteration(s)",
                describe_outcome(primary.outcome),
                primary.iterations.len()
            );
        }
        if let Some(retry) = &report.retry {
            let _ = writeln!(
                out,
                "Final-verification fix loop: {} after {} iteration(s)",
                describe_outcome(retry.outcome),
                retry.iterations.len()
            );
        }

        let _ = writeln!(
            out,
            "\nBudget change statistics ({} total changes):",
            report.statistics.total
        );
        let _ = writeln!(
            out,
            "{}",
            render_statistics(&report.statistics, &self.literal_name)
        );

        if report.mode == RunMode::DryRun {
            let _ = writeln!(out, "\n  Files that would be updated: {}", report.pending_files.len());
            for file in &report.pending_files {
                let _ = writeln!(out, "    {}", file.display());
            }
        } else if !report.state.modified_files.is_empty() {
            let _ = writeln!(out, "\n  Updated {} files:", report.state.modified_files.len());
            for file in &report.state.modified_files {
                let _ = writeln!(out, "    {}", file.display());
            }
        }

        out.push('\n');
        if report.success {
            let message = match report.mode {
                RunMode::DryRun => "Dry run complete, no files modified.",
                RunMode::Apply => "All tests passed!",
            };
            out.push_str(&action_success(message));
        } else {
            out.push_str(&action_failure("Some tests still failing after all iterations:"));
            for test in &report.failing_tests {
                let _ = write!(out, "\n    {test}");
            }
        }
        out
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
