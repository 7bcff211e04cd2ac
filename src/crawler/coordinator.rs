//! Crawl coordinator - breadth-first traversal from a single seed
//!
//! The traversal is strictly sequential: one page at a time, in FIFO order,
//! with the visited set as the only cycle guard.

use crate::crawler::frontier::Frontier;
use crate::crawler::LinkSource;
use crate::model::CrawlManifest;
use crate::state::{ErrorLedger, Stage};
use crate::Result;
use std::path::PathBuf;
use std::time::Instant;

/// Result of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub manifest: CrawlManifest,
    pub pages_visited: usize,
}

/// Drives the traversal and writes the manifest
pub struct Crawler<S> {
    source: S,
    manifest_path: PathBuf,
    ledger: ErrorLedger,
}

impl<S: LinkSource> Crawler<S> {
    pub fn new(source: S, manifest_path: impl Into<PathBuf>, ledger: ErrorLedger) -> Self {
        Self {
            source,
            manifest_path: manifest_path.into(),
            ledger,
        }
    }

    /// Crawls from `seed_url` and returns the manifest it wrote
    pub async fn crawl(&self, seed_url: &str, max_pages: Option<usize>) -> Result<CrawlManifest> {
        Ok(self.run(seed_url, max_pages).await?.manifest)
    }

    /// Crawls from `seed_url`, visiting at most `max_pages` pages
    ///
    /// Per-page failures are recorded and traversal continues. A fatal
    /// error (policy violation) aborts the crawl before the manifest is
    /// written.
    pub async fn run(&self, seed_url: &str, max_pages: Option<usize>) -> Result<CrawlOutcome> {
        tracing::info!("Starting crawl from {}", seed_url);
        let start_time = Instant::now();
        let mut frontier = Frontier::seeded(seed_url);

        loop {
            if let Some(cap) = max_pages {
                if frontier.visited_count() >= cap {
                    tracing::info!("Reached page cap of {}", cap);
                    break;
                }
            }

            let Some(page) = frontier.next_page() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            let links = match self.source.links(&page.url).await {
                Ok(links) => links,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("Failed to extract links from {}: {}", page.url, e);
                    self.ledger.record(Stage::Crawl, &page.url, e.to_string());
                    continue;
                }
            };

            let added = frontier.absorb(links);
            tracing::info!(
                "[{}] {} -> {} new links ({} collected, {} queued)",
                frontier.visited_count(),
                page.url,
                added,
                frontier.collected().len(),
                frontier.queued()
            );
        }

        let pages_visited = frontier.visited_count();
        let manifest = CrawlManifest::new(frontier.into_links());
        manifest.save(&self.manifest_path)?;

        tracing::info!(
            "Crawl completed: {} pages visited, {} links saved to {} in {:?}",
            pages_visited,
            manifest.total_links,
            self.manifest_path.display(),
            start_time.elapsed()
        );

        Ok(CrawlOutcome {
            manifest,
            pages_visited,
        })
    }
}
