//! URL handling module for Normativa-Harvest
//!
//! This module provides host extraction, allow-list matching, link
//! classification, and the URL-to-filename mapping used by the download
//! stage.

mod domain;
mod filename;
mod matcher;

use crate::model::LinkKind;

// Re-export main functions
pub use domain::extract_domain;
pub use filename::document_filename;
pub use matcher::{host_is_allowed, matches_wildcard};

/// Classifies an absolute URL found on a page
///
/// Only URLs starting with `base_prefix` are kept. Among those, a trailing
/// `.aspx` marks a traversable page and a trailing `.pdf` marks a document
/// (ASCII case-insensitive). Everything else is discarded.
///
/// # Examples
///
/// ```
/// use normativa_harvest::model::LinkKind;
/// use normativa_harvest::url::classify_link;
///
/// let base = "https://www.minsalud.gov.co/Normativa/";
/// assert_eq!(
///     classify_link("https://www.minsalud.gov.co/Normativa/Paginas/a.aspx", base),
///     Some(LinkKind::Page)
/// );
/// assert_eq!(
///     classify_link("https://www.minsalud.gov.co/Normativa/Decretos/d.pdf", base),
///     Some(LinkKind::Document)
/// );
/// assert_eq!(classify_link("https://www.minsalud.gov.co/Paginas/x.aspx", base), None);
/// ```
pub fn classify_link(url: &str, base_prefix: &str) -> Option<LinkKind> {
    if !url.starts_with(base_prefix) {
        return None;
    }

    let lowered = url.to_ascii_lowercase();
    if lowered.ends_with(".aspx") {
        Some(LinkKind::Page)
    } else if lowered.ends_with(".pdf") {
        Some(LinkKind::Document)
    } else {
        None
    }
}
