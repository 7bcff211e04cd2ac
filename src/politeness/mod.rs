//! Politeness layer governing every outbound request
//!
//! All HTTP traffic (page fetches, robots.txt, document downloads) goes
//! through one shared [`PolitenessGate`]. The gate owns the HTTP client, the
//! allow-list, the robots.txt cache, the global request window and the
//! audit log.

mod audit;
mod client;
mod compliance;
mod gate;
mod privacy;

pub use audit::{AuditEntry, AuditLog};
pub use client::build_http_client;
pub use compliance::{compliance_report, ComplianceCheck};
pub use gate::PolitenessGate;
pub use privacy::{scan_personal_data, warn_on_personal_data};
