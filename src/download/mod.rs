//! Download stage: fetch every document link into the documents directory
//!
//! Downloads run concurrently under a fixed worker limit, and every request
//! still passes through the shared politeness gate, so the global rate
//! limits bound the pool as a whole.

mod manager;

pub use manager::{DownloadManager, DownloadSummary};

use crate::model::CrawlManifest;
use crate::Result;
use std::path::Path;

/// Reads the manifest a standalone download run starts from
pub fn load_manifest(path: &Path) -> Result<CrawlManifest> {
    let manifest = CrawlManifest::load(path)?;
    tracing::info!(
        "Loaded manifest from {} ({} links, {} documents)",
        path.display(),
        manifest.total_links,
        manifest.documents().count()
    );
    Ok(manifest)
}
