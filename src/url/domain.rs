use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use normativa_harvest::url::extract_domain;
///
/// let url = Url::parse("https://WWW.MinSalud.gov.co/Normativa/").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.minsalud.gov.co".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
