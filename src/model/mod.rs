//! Data carried between pipeline stages
//!
//! - `Link` / `CrawlManifest`: what the crawler discovers and hands to the
//!   download stage
//! - `ExtractionRecord`: one extracted document, handed to the persistence stage

mod link;
mod record;

pub use link::{CrawlManifest, Link, LinkKind};
pub use record::{ExtractionMethod, ExtractionRecord};
