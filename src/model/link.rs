use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::HarvestError;

/// What a discovered link points to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    /// A traversable page (`.aspx`)
    #[serde(rename = "ASPX")]
    Page,

    /// A downloadable document (`.pdf`)
    #[serde(rename = "PDF")]
    Document,
}

/// A classified absolute URL found on a crawled page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: LinkKind,
}

impl Link {
    pub fn page(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: LinkKind::Page,
        }
    }

    pub fn document(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: LinkKind::Document,
        }
    }

    pub fn is_page(&self) -> bool {
        self.kind == LinkKind::Page
    }

    pub fn is_document(&self) -> bool {
        self.kind == LinkKind::Document
    }
}

/// Snapshot of every link discovered by one crawl run
///
/// Serialized as `{timestamp, total_links, links: [{url, type}]}`. The
/// manifest is the only thing a standalone download run reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlManifest {
    pub timestamp: DateTime<Utc>,
    pub total_links: usize,
    pub links: Vec<Link>,
}

impl CrawlManifest {
    pub fn new(links: Vec<Link>) -> Self {
        Self {
            timestamp: Utc::now(),
            total_links: links.len(),
            links,
        }
    }

    /// Document links only, in discovery order
    pub fn documents(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(|link| link.is_document())
    }

    /// Writes the manifest as pretty JSON, replacing any previous one
    pub fn save(&self, path: &Path) -> Result<(), HarvestError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reads a manifest written by a previous crawl
    pub fn load(path: &Path) -> Result<Self, HarvestError> {
        if !path.exists() {
            return Err(HarvestError::ManifestMissing(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
