//! Output module for stage reports and store inspection
//!
//! This module handles:
//! - Stage reports and the end-of-run summary
//! - Document store statistics, search results and single documents
//! - The environment check

mod environment;
pub mod stats;
mod summary;

pub use environment::{
    format_environment_report, print_environment_report, EnvironmentReport, SeedStatus,
};
pub use stats::{
    load_statistics, print_document, print_search_hits, print_statistics, StoreStatistics,
};
pub use summary::{
    format_errors, format_run_summary, format_stage_report, print_run_summary,
    print_stage_report, RunSummary, StageReport, ERRORS_SHOWN,
};
