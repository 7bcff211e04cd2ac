use crate::config::Config;
use crate::politeness::{build_http_client, AuditLog};
use crate::robots::{fetch_robots, CachedRobots};
use crate::state::RequestWindow;
use crate::url::{extract_domain, host_is_allowed};
use crate::{HarvestError, Result};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use url::Url;

/// Single gate every outbound request passes through
///
/// Shared behind an `Arc` by the crawler and all download workers. The
/// request window lives under one async mutex which stays locked while a
/// caller sleeps, so the interval and per-minute limits hold globally.
pub struct PolitenessGate {
    client: Client,
    allowed_domains: Vec<String>,
    robots_token: String,
    robots_cache_hours: i64,

    /// robots.txt rules keyed by origin (scheme, host, port)
    robots: Mutex<HashMap<String, CachedRobots>>,

    window: Mutex<RequestWindow>,
    audit: AuditLog,
}

impl PolitenessGate {
    /// Builds the gate and its HTTP client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let client = build_http_client(
            &config.user_agent,
            &config.politeness,
            &config.site.allowed_domains,
        )?;
        Ok(Self::with_client(config, client))
    }

    /// Builds the gate around an existing client
    pub fn with_client(config: &Config, client: Client) -> Self {
        let politeness = &config.politeness;
        let window = RequestWindow::new(
            Duration::from_millis(politeness.min_request_interval_ms),
            politeness.max_requests_per_minute as usize,
        );

        Self {
            client,
            allowed_domains: config.site.allowed_domains.clone(),
            robots_token: config.user_agent.robots_token(),
            robots_cache_hours: politeness.robots_cache_hours,
            robots: Mutex::new(HashMap::new()),
            window: Mutex::new(window),
            audit: AuditLog::new(&politeness.audit_log_path, config.user_agent.header_value()),
        }
    }

    /// Client carrying the identification headers
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.audit
    }

    /// Checks `url` against the allow-list and robots.txt
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The request may proceed
    /// * `Ok(false)` - robots.txt disallows the URL
    /// * `Err(HarvestError::PolicyViolation)` - The host is not on the allow-list
    pub async fn authorize(&self, url: &str) -> Result<bool> {
        let parsed = Url::parse(url)?;
        let domain = extract_domain(&parsed).unwrap_or_default();

        if domain.is_empty() || !host_is_allowed(&self.allowed_domains, &domain) {
            tracing::error!("Refusing request to {}: '{}' is not allowed", url, domain);
            self.audit.record(url, "authorize", "denied-domain");
            return Err(HarvestError::PolicyViolation {
                url: url.to_string(),
                domain,
            });
        }

        let allowed = self.robots_allow(&parsed).await;
        if allowed {
            self.audit.record(url, "authorize", "allowed");
        } else {
            tracing::warn!("robots.txt disallows {}", url);
            self.audit.record(url, "authorize", "denied-robots");
        }

        Ok(allowed)
    }

    async fn robots_allow(&self, url: &Url) -> bool {
        let origin = url.origin().ascii_serialization();
        let mut cache = self.robots.lock().await;

        if let Some(cached) = cache.get(&origin) {
            if !cached.is_stale(self.robots_cache_hours) {
                return cached.is_allowed(url.as_str());
            }
            tracing::debug!("robots.txt for {} is stale, refetching", origin);
        }

        let rules = fetch_robots(&self.client, url, &self.robots_token).await;
        let cached = CachedRobots::new(rules);
        let allowed = cached.is_allowed(url.as_str());
        cache.insert(origin, cached);
        allowed
    }

    /// Blocks until the global rate limits allow another request
    ///
    /// Applies the per-minute cap first, then the minimum interval, and
    /// records the request before returning.
    pub async fn wait_for_slot(&self) {
        let mut window = self.window.lock().await;
        loop {
            let now = Instant::now();
            match window.delay_before_next(now) {
                Some(delay) => {
                    tracing::debug!("Rate limit: waiting {:.1}s", delay.as_secs_f64());
                    sleep(delay).await;
                }
                None => {
                    window.record(now);
                    return;
                }
            }
        }
    }

    /// Authorizes `url` and, when allowed, waits for a request slot
    ///
    /// Returns `Ok(false)` when robots.txt disallows the URL; no slot is
    /// consumed in that case.
    pub async fn admit(&self, url: &str) -> Result<bool> {
        if !self.authorize(url).await? {
            return Ok(false);
        }
        self.wait_for_slot().await;
        self.audit.record(url, "request", "granted");
        Ok(true)
    }
}
