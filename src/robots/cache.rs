//! Robots.txt caching with a configurable lifetime

use crate::robots::RobotsRules;
use chrono::{DateTime, Duration, Utc};

/// Robots rules for one host along with when they were fetched
#[derive(Debug, Clone)]
pub struct CachedRobots {
    pub rules: RobotsRules,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    pub fn new(rules: RobotsRules) -> Self {
        Self {
            rules,
            fetched_at: Utc::now(),
        }
    }

    /// Checks if the entry is older than `max_age_hours`
    pub fn is_stale(&self, max_age_hours: i64) -> bool {
        self.age() > Duration::hours(max_age_hours)
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.fetched_at
    }

    pub fn is_allowed(&self, url: &str) -> bool {
        self.rules.is_allowed(url)
    }
}
