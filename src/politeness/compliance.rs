//! Precondition checked before any stage touches the network or the store

use crate::config::Config;
use crate::{HarvestError, Result};
use chrono::Utc;

/// Smallest minimum interval a run may be configured with
pub const MIN_ALLOWED_INTERVAL_MS: u64 = 1000;

/// Shortest user agent considered identifiable
pub const MIN_USER_AGENT_LEN: usize = 20;

/// Outcome of one compliance check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
}

/// Explicit precondition run at the start of every pipeline entry point
pub struct ComplianceCheck;

impl ComplianceCheck {
    /// Evaluates every check without failing
    pub fn evaluate(config: &Config) -> Vec<CheckResult> {
        vec![
            CheckResult {
                name: "request interval of at least one second",
                passed: config.politeness.min_request_interval_ms >= MIN_ALLOWED_INTERVAL_MS,
            },
            CheckResult {
                name: "identifiable user agent",
                passed: config.user_agent.header_value().chars().count() > MIN_USER_AGENT_LEN,
            },
            CheckResult {
                name: "domain allow-list",
                passed: !config.site.allowed_domains.is_empty(),
            },
            CheckResult {
                name: "audit log configured",
                passed: !config.politeness.audit_log_path.trim().is_empty(),
            },
        ]
    }

    /// Fails with [`HarvestError::Compliance`] naming every failed check
    pub fn run(config: &Config) -> Result<()> {
        let results = Self::evaluate(config);

        for check in &results {
            if check.passed {
                tracing::debug!("Compliance check passed: {}", check.name);
            } else {
                tracing::error!("Compliance check failed: {}", check.name);
            }
        }

        let failed: Vec<&str> = results
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.name)
            .collect();

        if failed.is_empty() {
            Ok(())
        } else {
            Err(HarvestError::Compliance(failed.join("; ")))
        }
    }
}

/// Plain-text report of the active politeness settings
pub fn compliance_report(config: &Config) -> String {
    let rule = "=".repeat(70);
    let mut out = String::new();

    out.push_str(&format!("{}\n", rule));
    out.push_str("COMPLIANCE REPORT\n");
    out.push_str(&format!("{}\n", rule));
    out.push_str(&format!("Generated: {}\n", Utc::now().format("%Y-%m-%d %H:%M:%S UTC")));
    out.push('\n');
    out.push_str("Politeness settings:\n");
    out.push_str(&format!(
        "  Minimum interval between requests: {} ms\n",
        config.politeness.min_request_interval_ms
    ));
    out.push_str(&format!(
        "  Maximum requests per minute:       {}\n",
        config.politeness.max_requests_per_minute
    ));
    out.push_str(&format!(
        "  robots.txt cache lifetime:         {} h\n",
        config.politeness.robots_cache_hours
    ));
    out.push_str(&format!(
        "  Concurrent downloads:              {}\n",
        config.download.max_workers
    ));
    out.push_str(&format!("  User-Agent: {}\n", config.user_agent.header_value()));
    out.push_str(&format!("  Audit log:  {}\n", config.politeness.audit_log_path));
    out.push('\n');
    out.push_str("Allowed domains:\n");
    for domain in &config.site.allowed_domains {
        out.push_str(&format!("  - {}\n", domain));
    }
    out.push('\n');
    out.push_str("Checks:\n");
    for check in ComplianceCheck::evaluate(config) {
        let mark = if check.passed { "PASS" } else { "FAIL" };
        out.push_str(&format!("  [{}] {}\n", mark, check.name));
    }
    out.push_str(&rule);

    out
}
