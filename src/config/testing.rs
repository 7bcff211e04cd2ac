//! Hand-built configurations for unit tests

use super::types::*;
use std::path::Path;

/// Configuration pointing at `base_url` with every output under `dir`
///
/// `base_url` is the site root (e.g. a mock server URI); the base prefix is
/// `{base_url}/Normativa/` and the seed is the prefix's `index.aspx`.
pub(crate) fn config_for(base_url: &str, dir: &Path) -> Config {
    let host = url::Url::parse(base_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default();
    let path = |name: &str| dir.join(name).to_string_lossy().into_owned();

    Config {
        site: SiteConfig {
            seed_url: format!("{}/Normativa/index.aspx", base_url),
            base_prefix: format!("{}/Normativa/", base_url),
            allowed_domains: vec![host],
            content_selectors: default_content_selectors(),
        },
        politeness: PolitenessConfig {
            min_request_interval_ms: 1000,
            max_requests_per_minute: 60,
            robots_cache_hours: 24,
            request_timeout_secs: 5,
            audit_log_path: path("audit.log"),
        },
        user_agent: UserAgentConfig {
            crawler_name: "NormativaHarvest".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.org/about".to_string(),
            contact_email: "admin@example.org".to_string(),
        },
        output: OutputConfig {
            manifest_path: path("links.json"),
            documents_dir: path("pdfs"),
            records_dir: path("records"),
        },
        download: DownloadConfig::default(),
        extraction: ExtractionConfig::default(),
        store: StoreConfig {
            database_path: path("normativa.db"),
            ..StoreConfig::default()
        },
    }
}
