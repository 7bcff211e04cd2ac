use crate::config::{PolitenessConfig, UserAgentConfig};
use crate::url::host_is_allowed;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, DNT, UPGRADE_INSECURE_REQUESTS};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::Duration;

const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "es-CO,es;q=0.9,en;q=0.8";
const MAX_REDIRECTS: usize = 10;

/// Builds the HTTP client shared by every stage
///
/// Identification headers are installed as client defaults so no request
/// can leave without them. Redirects are followed only while they stay on
/// the allow-list; a redirect elsewhere is returned to the caller as-is.
///
/// # Example
///
/// ```no_run
/// use normativa_harvest::config::{PolitenessConfig, UserAgentConfig};
/// use normativa_harvest::politeness::build_http_client;
///
/// let ua = UserAgentConfig {
///     crawler_name: "NormativaHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.org/about".to_string(),
///     contact_email: "admin@example.org".to_string(),
/// };
///
/// let allowed = vec!["*.minsalud.gov.co".to_string()];
/// let client = build_http_client(&ua, &PolitenessConfig::default(), &allowed).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    politeness: &PolitenessConfig,
    allowed_domains: &[String],
) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

    let allowed = allowed_domains.to_vec();
    let redirect = Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        let on_list = attempt
            .url()
            .host_str()
            .map(|host| host_is_allowed(&allowed, host))
            .unwrap_or(false);
        if on_list {
            attempt.follow()
        } else {
            tracing::warn!("Not following redirect to {}", attempt.url());
            attempt.stop()
        }
    });

    Client::builder()
        .user_agent(user_agent.header_value())
        .default_headers(headers)
        .timeout(Duration::from_secs(politeness.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(redirect)
        .gzip(true)
        .brotli(true)
        .build()
}
