//! Crawler module: link discovery over the regulatory site
//!
//! - `fetcher`: GET a page and classify the outcome
//! - `parser`: pick the content container and classify its links
//! - `link_extractor`: the gate-respecting [`LinkSource`] used in production
//! - `frontier`: FIFO queue, visited set and collected links
//! - `coordinator`: the breadth-first loop that writes the manifest

mod coordinator;
mod fetcher;
mod frontier;
mod link_extractor;
mod parser;

pub use coordinator::{CrawlOutcome, Crawler};
pub use fetcher::{fetch_page, FetchResult};
pub use frontier::Frontier;
pub use link_extractor::LinkExtractor;
pub use parser::{parse_links, ContentSelectors};

pub(crate) use fetcher::classify_error;

use crate::model::Link;
use crate::Result;
use async_trait::async_trait;

/// Anything that can list the links found on a page
///
/// The production implementation is [`LinkExtractor`]; tests drive the
/// crawler with a fixed link graph.
#[async_trait]
pub trait LinkSource: Send + Sync {
    async fn links(&self, page_url: &str) -> Result<Vec<Link>>;
}
