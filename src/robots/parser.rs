//! Robots.txt rule parsing
//!
//! Supports the subset the harvested sites actually use: `User-agent` groups
//! and `Disallow` lines. Matching is a substring test of the disallowed path
//! against the full URL, which over-blocks compared with prefix matching.

/// Rules that apply to this crawler after reading a robots.txt file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsRules {
    /// Disallowed paths from every group that matched our token
    disallowed: Vec<String>,
}

impl RobotsRules {
    /// Parses robots.txt content for the given user-agent token
    ///
    /// A group applies when its `User-agent` value is `*` or contains
    /// `token`. Lines are compared case-insensitively.
    pub fn parse(content: &str, token: &str) -> Self {
        let token = token.to_lowercase();
        let mut disallowed = Vec::new();
        let mut group_applies = false;

        for raw in content.lines() {
            let line = match raw.split_once('#') {
                Some((before, _)) => before,
                None => raw,
            }
            .trim()
            .to_lowercase();

            if line.is_empty() {
                continue;
            }

            if let Some(agent) = line.strip_prefix("user-agent:") {
                let agent = agent.trim();
                group_applies = agent == "*" || (!token.is_empty() && agent.contains(&token));
            } else if let Some(path) = line.strip_prefix("disallow:") {
                let path = path.trim();
                if group_applies && !path.is_empty() {
                    disallowed.push(path.to_string());
                }
            }
        }

        Self { disallowed }
    }

    /// Rules that block nothing
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Checks whether `url` may be fetched
    pub fn is_allowed(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        !self.disallowed.iter().any(|path| url.contains(path.as_str()))
    }

    pub fn disallowed_paths(&self) -> &[String] {
        &self.disallowed
    }
}
