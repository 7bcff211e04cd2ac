use crate::config::types::{
    Config, DownloadConfig, ExtractionConfig, OutputConfig, PolitenessConfig, SiteConfig,
    StoreConfig, UserAgentConfig,
};
use crate::url::matches_wildcard;
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_politeness_config(&config.politeness)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_download_config(&config.download)?;
    validate_extraction_config(&config.extraction)?;
    validate_store_config(&config.store)?;
    Ok(())
}

/// Validates the harvested site: seed, prefix, allow-list and selectors
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config.allowed_domains.is_empty() {
        return Err(ConfigError::Validation(
            "allowed_domains must list at least one domain".to_string(),
        ));
    }

    for pattern in &config.allowed_domains {
        validate_domain_pattern(pattern)?;
    }

    let seed = parse_http_url("seed_url", &config.seed_url)?;
    parse_http_url("base_prefix", &config.base_prefix)?;

    let seed_host = seed.host_str().unwrap_or_default().to_lowercase();
    if !config
        .allowed_domains
        .iter()
        .any(|pattern| matches_wildcard(&pattern.to_lowercase(), &seed_host))
    {
        return Err(ConfigError::Validation(format!(
            "Seed host '{}' is not covered by allowed_domains",
            seed_host
        )));
    }

    if config.content_selectors.is_empty() {
        return Err(ConfigError::Validation(
            "content_selectors cannot be empty".to_string(),
        ));
    }

    for selector in &config.content_selectors {
        Selector::parse(selector).map_err(|e| {
            ConfigError::Validation(format!("Invalid content selector '{}': {:?}", selector, e))
        })?;
    }

    Ok(())
}

fn parse_http_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            field, value
        )));
    }

    Ok(url)
}

/// Validates rate limits and request etiquette
fn validate_politeness_config(config: &PolitenessConfig) -> Result<(), ConfigError> {
    if config.max_requests_per_minute < 1 {
        return Err(ConfigError::Validation(format!(
            "max_requests_per_minute must be >= 1, got {}",
            config.max_requests_per_minute
        )));
    }

    if config.robots_cache_hours < 0 {
        return Err(ConfigError::Validation(format!(
            "robots_cache_hours cannot be negative, got {}",
            config.robots_cache_hours
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("manifest_path", &config.manifest_path),
        ("documents_dir", &config.documents_dir),
        ("records_dir", &config.records_dir),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > 32 {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and 32, got {}",
            config.max_workers
        )));
    }
    Ok(())
}

fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    if config.ocr_language.trim().is_empty() {
        return Err(ConfigError::Validation(
            "ocr_language cannot be empty".to_string(),
        ));
    }

    if !(72..=1200).contains(&config.render_dpi) {
        return Err(ConfigError::Validation(format!(
            "render_dpi must be between 72 and 1200, got {}",
            config.render_dpi
        )));
    }

    Ok(())
}

fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be >= 1, got {}",
            config.batch_size
        )));
    }

    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(domain) => validate_domain_string(domain),
        None => validate_domain_string(pattern),
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
