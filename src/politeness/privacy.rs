//! Warn-only scan for personal data in extracted text

use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

const PATTERNS: &[(&str, &str)] = &[
    ("national-id", r"\b\d{8,10}\b"),
    ("email", r"\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b"),
    ("phone", r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b"),
    ("password", r"\bpassword\b"),
    ("token", r"\btoken\b"),
];

fn compiled() -> &'static [(&'static str, Regex)] {
    static COMPILED: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        PATTERNS
            .iter()
            .filter_map(|(name, pattern)| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .ok()
                    .map(|re| (*name, re))
            })
            .collect()
    })
}

/// Names of the personal-data patterns found in `text`
pub fn scan_personal_data(text: &str) -> Vec<&'static str> {
    compiled()
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(name, _)| *name)
        .collect()
}

/// Logs a warning when `text` looks like it contains personal data
///
/// Never blocks: the document is still processed.
pub fn warn_on_personal_data(source: &str, text: &str) -> bool {
    let hits = scan_personal_data(text);
    if hits.is_empty() {
        return false;
    }
    tracing::warn!(
        "Possible personal data in {} ({}); review before publishing",
        source,
        hits.join(", ")
    );
    true
}
