use sha2::{Digest, Sha256};
use url::Url;

/// Derives the local filename a document URL is stored under
///
/// The last non-empty path segment is used, with characters outside
/// `[A-Za-z0-9._%-]` replaced by `_`. Query strings and fragments are
/// ignored. A `.pdf` extension is appended when missing. URLs without a
/// usable segment fall back to `document-<hash>.pdf`, where the hash is the
/// first 16 hex digits of the URL's SHA-256.
///
/// # Examples
///
/// ```
/// use normativa_harvest::url::document_filename;
///
/// assert_eq!(
///     document_filename("https://www.minsalud.gov.co/Normativa/Decretos/doc1.pdf"),
///     "doc1.pdf"
/// );
/// assert_eq!(
///     document_filename("https://www.minsalud.gov.co/Normativa/Resolucion%20123"),
///     "Resolucion%20123.pdf"
/// );
/// ```
pub fn document_filename(url: &str) -> String {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').find(|s| !s.is_empty()))
            .map(str::to_string),
    };

    let sanitized: String = segment
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '%') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let stem = if sanitized.trim_matches('.').is_empty() {
        let digest = Sha256::digest(url.as_bytes());
        format!("document-{}", &hex::encode(digest)[..16])
    } else {
        sanitized
    };

    if stem.to_ascii_lowercase().ends_with(".pdf") {
        stem
    } else {
        format!("{}.pdf", stem)
    }
}
