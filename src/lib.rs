//! Normativa-Harvest: a polite ingestion pipeline for regulatory documents
//!
//! This crate crawls a single government regulatory site, downloads the PDF
//! documents it links to, extracts their text (text layer first, OCR as a
//! fallback) and persists the results into a searchable document store.
//! Every outbound request goes through one shared politeness gate that
//! enforces the domain allow-list, robots.txt and request-rate limits.

pub mod config;
pub mod crawler;
pub mod download;
pub mod extraction;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod politeness;
pub mod robots;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Normativa-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Policy violation: domain '{domain}' is not on the allow-list ({url})")]
    PolicyViolation { url: String, domain: String },

    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Text extraction failed for {file}: {message}")]
    Extraction { file: String, message: String },

    #[error("Document store unavailable at {location}: {reason}")]
    StoreUnavailable { location: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Compliance check failed: {0}")]
    Compliance(String),

    #[error("Manifest not found at {0}; run the crawl stage first")]
    ManifestMissing(String),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarvestError {
    /// Returns true for errors that must abort the current stage
    ///
    /// Everything else is a per-item failure that belongs in the error ledger.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::PolicyViolation { .. }
                | Self::StoreUnavailable { .. }
                | Self::Compliance(_)
                | Self::Config(_)
                | Self::ManifestMissing(_)
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing domain in URL: {0}")]
    MissingDomain(String),
}

/// Result type alias for Normativa-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{CrawlManifest, ExtractionMethod, ExtractionRecord, Link, LinkKind};
pub use politeness::PolitenessGate;
pub use state::ErrorLedger;
