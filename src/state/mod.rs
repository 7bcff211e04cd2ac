//! State shared across a harvest run
//!
//! # Components
//!
//! - `RequestWindow`: request history behind the politeness gate's rate limits
//! - `ErrorLedger`: append-only list of per-item failures surfaced in the summary

mod ledger;
mod request_window;

pub use ledger::{ErrorLedger, LedgerEntry, Stage};
pub use request_window::RequestWindow;
