/// Checks if a host matches an allow-list pattern
///
/// Two kinds of patterns are supported:
/// 1. Exact match: "www.minsalud.gov.co" matches only that host
/// 2. Wildcard match: "*.minsalud.gov.co" matches:
///    - "minsalud.gov.co" (the bare domain)
///    - "www.minsalud.gov.co" (single subdomain)
///    - "a.b.minsalud.gov.co" (nested subdomains)
///
/// Both sides are expected to be lowercase already.
///
/// # Examples
///
/// ```
/// use normativa_harvest::url::matches_wildcard;
///
/// assert!(matches_wildcard("minsalud.gov.co", "minsalud.gov.co"));
/// assert!(!matches_wildcard("minsalud.gov.co", "datos.gov.co"));
///
/// assert!(matches_wildcard("*.minsalud.gov.co", "minsalud.gov.co"));
/// assert!(matches_wildcard("*.minsalud.gov.co", "www.minsalud.gov.co"));
/// assert!(!matches_wildcard("*.minsalud.gov.co", "fakeminsalud.gov.co"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}

/// Checks a host against every pattern of an allow-list (case-insensitive)
pub fn host_is_allowed(patterns: &[String], host: &str) -> bool {
    let host = host.to_lowercase();
    patterns
        .iter()
        .any(|pattern| matches_wildcard(&pattern.to_lowercase(), &host))
}
