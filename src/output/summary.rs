//! Stage reports and the run summary
//!
//! Every pipeline entry point returns a [`StageReport`]; a full run
//! collects them into a [`RunSummary`].

use crate::state::{LedgerEntry, Stage};
use std::time::Duration;

/// How many ledger entries a report prints before summarizing the rest
pub const ERRORS_SHOWN: usize = 5;

/// Counts and per-item failures of one stage invocation
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: Stage,
    /// Named counters in display order
    pub counts: Vec<(&'static str, usize)>,
    pub errors: Vec<LedgerEntry>,
    pub elapsed: Duration,
}

impl StageReport {
    pub fn new(stage: Stage, elapsed: Duration) -> Self {
        Self {
            stage,
            counts: Vec::new(),
            errors: Vec::new(),
            elapsed,
        }
    }

    pub fn count(mut self, name: &'static str, value: usize) -> Self {
        self.counts.push((name, value));
        self
    }

    pub fn with_errors(mut self, errors: Vec<LedgerEntry>) -> Self {
        self.errors = errors;
        self
    }

    /// Value of a named counter, if the stage reports it
    pub fn get(&self, name: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(counter, _)| *counter == name)
            .map(|(_, value)| *value)
    }
}

/// Reports of every stage in a full pipeline run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<StageReport>,
}

impl RunSummary {
    pub fn push(&mut self, report: StageReport) {
        self.reports.push(report);
    }

    pub fn total_errors(&self) -> usize {
        self.reports.iter().map(|r| r.errors.len()).sum()
    }

    pub fn elapsed(&self) -> Duration {
        self.reports.iter().map(|r| r.elapsed).sum()
    }
}

/// Formats a stage report as plain text
pub fn format_stage_report(report: &StageReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== {} ({:.1}s) ===\n",
        report.stage,
        report.elapsed.as_secs_f64()
    ));
    for (name, value) in &report.counts {
        out.push_str(&format!("  {}: {}\n", name, value));
    }

    if !report.errors.is_empty() {
        out.push_str(&format!("  Errors ({}):\n", report.errors.len()));
        out.push_str(&format_errors(&report.errors));
    }

    out
}

/// First [`ERRORS_SHOWN`] entries, then a count of the remainder
pub fn format_errors(errors: &[LedgerEntry]) -> String {
    let mut out = String::new();

    for entry in errors.iter().take(ERRORS_SHOWN) {
        out.push_str(&format!("    - {}\n", entry));
    }
    if errors.len() > ERRORS_SHOWN {
        out.push_str(&format!("    ... and {} more\n", errors.len() - ERRORS_SHOWN));
    }

    out
}

/// Formats every stage report followed by run totals
pub fn format_run_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    for report in &summary.reports {
        out.push_str(&format_stage_report(report));
        out.push('\n');
    }

    out.push_str(&format!(
        "Pipeline finished in {:.1}s with {} recorded errors\n",
        summary.elapsed().as_secs_f64(),
        summary.total_errors()
    ));

    out
}

pub fn print_stage_report(report: &StageReport) {
    print!("{}", format_stage_report(report));
}

pub fn print_run_summary(summary: &RunSummary) {
    print!("{}", format_run_summary(summary));
}
