//! Robots.txt handling module
//!
//! Fetches robots.txt for a host, parses the rules that apply to this
//! crawler and caches them for a configurable number of hours.

mod cache;
mod parser;

pub use cache::CachedRobots;
pub use parser::RobotsRules;

use reqwest::{Client, StatusCode};
use url::Url;

/// Builds the robots.txt location for the host serving `url`
pub fn robots_url_for(url: &Url) -> Option<Url> {
    url.host_str()?;
    url.join("/robots.txt").ok()
}

/// Fetches and parses robots.txt for the host serving `url`
///
/// A missing file or any fetch failure yields rules that allow everything.
pub async fn fetch_robots(client: &Client, url: &Url, token: &str) -> RobotsRules {
    let Some(robots_url) = robots_url_for(url) else {
        return RobotsRules::allow_all();
    };

    let response = match client.get(robots_url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Could not fetch {}: {}; allowing all", robots_url, e);
            return RobotsRules::allow_all();
        }
    };

    match response.status() {
        StatusCode::OK => match response.text().await {
            Ok(body) => {
                let rules = RobotsRules::parse(&body, token);
                tracing::debug!(
                    "Loaded {} with {} disallowed paths",
                    robots_url,
                    rules.disallowed_paths().len()
                );
                rules
            }
            Err(e) => {
                tracing::warn!("Could not read {}: {}; allowing all", robots_url, e);
                RobotsRules::allow_all()
            }
        },
        StatusCode::NOT_FOUND => {
            tracing::debug!("No robots.txt at {}", robots_url);
            RobotsRules::allow_all()
        }
        status => {
            tracing::warn!("{} returned {}; allowing all", robots_url, status);
            RobotsRules::allow_all()
        }
    }
}
