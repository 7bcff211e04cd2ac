use crate::config::SiteConfig;
use crate::crawler::fetcher::{fetch_page, FetchResult};
use crate::crawler::parser::{parse_links, ContentSelectors};
use crate::crawler::LinkSource;
use crate::model::Link;
use crate::politeness::PolitenessGate;
use crate::state::{ErrorLedger, Stage};
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// Fetches a page through the politeness gate and returns its links
///
/// Network and HTTP failures never escape: they are logged, recorded in the
/// error ledger and produce an empty list. Only a policy violation (a host
/// off the allow-list) is returned as an error.
pub struct LinkExtractor {
    gate: Arc<PolitenessGate>,
    base_prefix: String,
    selectors: ContentSelectors,
    ledger: ErrorLedger,
}

impl LinkExtractor {
    pub fn new(gate: Arc<PolitenessGate>, site: &SiteConfig, ledger: ErrorLedger) -> Self {
        Self {
            gate,
            base_prefix: site.base_prefix.clone(),
            selectors: ContentSelectors::new(site.content_selectors.as_slice()),
            ledger,
        }
    }

    pub async fn extract(&self, page_url: &str) -> Result<Vec<Link>> {
        if !self.gate.admit(page_url).await? {
            tracing::warn!("Skipping {}: disallowed by robots.txt", page_url);
            return Ok(Vec::new());
        }

        tracing::debug!("Fetching page {}", page_url);
        let result = fetch_page(self.gate.client(), page_url).await;

        let body = match result {
            FetchResult::Success { body, .. } => body,
            failure => {
                let reason = failure.failure_reason().unwrap_or_default();
                tracing::warn!("Failed to fetch {}: {}", page_url, reason);
                self.ledger.record(Stage::Crawl, page_url, reason);
                return Ok(Vec::new());
            }
        };

        // Relative hrefs resolve against the requested URL, even after a redirect
        let base = Url::parse(page_url)?;
        let links = parse_links(&body, &base, &self.base_prefix, &self.selectors);

        tracing::debug!("{} yielded {} links", page_url, links.len());
        Ok(links)
    }
}

#[async_trait]
impl LinkSource for LinkExtractor {
    async fn links(&self, page_url: &str) -> Result<Vec<Link>> {
        self.extract(page_url).await
    }
}
