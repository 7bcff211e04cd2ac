//! Environment check results
//!
//! Printed by the `check` command before a first run.

/// How the seed page answered a single gated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedStatus {
    Reachable(u16),
    HttpError(u16),
    Disallowed,
    Unreachable(String),
}

/// External tools found on the PATH and the state of the seed page
#[derive(Debug, Clone)]
pub struct EnvironmentReport {
    pub tools: Vec<(&'static str, bool)>,
    pub seed_url: String,
    pub seed: SeedStatus,
}

impl EnvironmentReport {
    /// True when every tool is installed and the seed answered 2xx
    pub fn is_ready(&self) -> bool {
        self.tools.iter().all(|(_, found)| *found) && matches!(self.seed, SeedStatus::Reachable(_))
    }
}

pub fn format_environment_report(report: &EnvironmentReport) -> String {
    let mut out = String::new();

    out.push_str("=== Environment ===\n");
    out.push_str("External tools:\n");
    for (name, found) in &report.tools {
        let mark = if *found { "found" } else { "MISSING" };
        out.push_str(&format!("  [{}] {}\n", mark, name));
    }

    out.push_str(&format!("Seed page {}:\n", report.seed_url));
    let seed = match &report.seed {
        SeedStatus::Reachable(code) => format!("  reachable (HTTP {})\n", code),
        SeedStatus::HttpError(code) => format!("  answered HTTP {}\n", code),
        SeedStatus::Disallowed => "  disallowed by robots.txt\n".to_string(),
        SeedStatus::Unreachable(reason) => format!("  unreachable: {}\n", reason),
    };
    out.push_str(&seed);

    out
}

pub fn print_environment_report(report: &EnvironmentReport) {
    print!("{}", format_environment_report(report));
}
