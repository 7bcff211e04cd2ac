use serde::Deserialize;

/// Main configuration structure for Normativa-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub politeness: PolitenessConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// The single site being harvested
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Page the crawl starts from
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Only links starting with this prefix are kept
    #[serde(rename = "base-prefix")]
    pub base_prefix: String,

    /// Hosts requests may be sent to (exact or "*.example.com")
    #[serde(rename = "allowed-domains")]
    pub allowed_domains: Vec<String>,

    /// Candidate selectors for the main content container, tried in order
    #[serde(rename = "content-selectors", default = "default_content_selectors")]
    pub content_selectors: Vec<String>,
}

/// Rate limiting and request etiquette
#[derive(Debug, Clone, Deserialize)]
pub struct PolitenessConfig {
    /// Minimum gap between any two requests (milliseconds)
    #[serde(rename = "min-request-interval-ms", default = "default_min_interval")]
    pub min_request_interval_ms: u64,

    /// Maximum requests inside any trailing 60 second window
    #[serde(rename = "max-requests-per-minute", default = "default_per_minute")]
    pub max_requests_per_minute: u32,

    /// How long a fetched robots.txt stays valid (hours)
    #[serde(rename = "robots-cache-hours", default = "default_robots_hours")]
    pub robots_cache_hours: i64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Append-only audit log of every checked request
    #[serde(rename = "audit-log-path", default = "default_audit_log")]
    pub audit_log_path: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Full User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }

    /// Token matched against robots.txt `User-agent` lines
    pub fn robots_token(&self) -> String {
        self.crawler_name.to_lowercase()
    }
}

/// Where each stage leaves its durable output
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Crawl manifest (JSON)
    #[serde(rename = "manifest-path")]
    pub manifest_path: String,

    /// Directory receiving downloaded PDFs
    #[serde(rename = "documents-dir")]
    pub documents_dir: String,

    /// Directory receiving one JSON record per extracted document
    #[serde(rename = "records-dir")]
    pub records_dir: String,
}

/// Download stage settings
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    /// Maximum downloads in flight at once
    #[serde(rename = "max-workers", default = "default_workers")]
    pub max_workers: usize,
}

/// Text extraction settings
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Extracted text must be longer than this (after trimming)
    #[serde(rename = "min-text-chars", default = "default_min_chars")]
    pub min_text_chars: usize,

    /// Tesseract language code
    #[serde(rename = "ocr-language", default = "default_ocr_language")]
    pub ocr_language: String,

    /// Extra Tesseract arguments
    #[serde(rename = "ocr-args", default = "default_ocr_args")]
    pub ocr_args: Vec<String>,

    /// Resolution used to render pages for OCR
    #[serde(rename = "render-dpi", default = "default_render_dpi")]
    pub render_dpi: u32,
}

/// Document store settings
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,

    /// Documents per bulk insert
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// How long to wait on a locked database (milliseconds)
    #[serde(rename = "busy-timeout-ms", default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            min_request_interval_ms: default_min_interval(),
            max_requests_per_minute: default_per_minute(),
            robots_cache_hours: default_robots_hours(),
            request_timeout_secs: default_timeout(),
            audit_log_path: default_audit_log(),
        }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_workers: default_workers(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_text_chars: default_min_chars(),
            ocr_language: default_ocr_language(),
            ocr_args: default_ocr_args(),
            render_dpi: default_render_dpi(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            batch_size: default_batch_size(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

pub(crate) fn default_content_selectors() -> Vec<String> {
    ["div.container_blanco", "div.contenido", "div.content", "div.main-content"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_min_interval() -> u64 {
    2000
}

fn default_per_minute() -> u32 {
    20
}

fn default_robots_hours() -> i64 {
    24
}

fn default_timeout() -> u64 {
    30
}

fn default_audit_log() -> String {
    "logs/audit.log".to_string()
}

fn default_workers() -> usize {
    4
}

fn default_min_chars() -> usize {
    50
}

fn default_ocr_language() -> String {
    "spa".to_string()
}

fn default_ocr_args() -> Vec<String> {
    vec![
        "--oem".to_string(),
        "3".to_string(),
        "--psm".to_string(),
        "6".to_string(),
    ]
}

fn default_render_dpi() -> u32 {
    300
}

fn default_database_path() -> String {
    "data/normativa.db".to_string()
}

fn default_batch_size() -> usize {
    100
}

fn default_busy_timeout() -> u64 {
    5000
}
