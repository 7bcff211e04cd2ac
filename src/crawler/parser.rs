//! HTML parsing for link discovery
//!
//! Links are read only from the page's main content container, which keeps
//! site-wide navigation out of the traversal.

use crate::model::Link;
use crate::url::classify_link;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Compiled content selectors, tried in order
#[derive(Debug, Clone)]
pub struct ContentSelectors {
    candidates: Vec<Selector>,
    body: Option<Selector>,
    anchor: Option<Selector>,
}

impl ContentSelectors {
    /// Compiles the candidate selectors, skipping any that do not parse
    pub fn new<S: AsRef<str>>(candidates: &[S]) -> Self {
        let candidates = candidates
            .iter()
            .filter_map(|s| match Selector::parse(s.as_ref()) {
                Ok(selector) => Some(selector),
                Err(e) => {
                    tracing::warn!("Ignoring content selector '{}': {:?}", s.as_ref(), e);
                    None
                }
            })
            .collect();

        Self {
            candidates,
            body: Selector::parse("body").ok(),
            anchor: Selector::parse("a[href]").ok(),
        }
    }

    /// First container matching a candidate, else `<body>`, else the root
    fn content_root<'a>(&self, document: &'a Html) -> ElementRef<'a> {
        self.candidates
            .iter()
            .chain(self.body.iter())
            .find_map(|selector| document.select(selector).next())
            .unwrap_or_else(|| document.root_element())
    }
}

/// Extracts classified links from a page's content container
///
/// Every `href` is resolved against `page_url`; only absolute URLs that
/// start with `base_prefix` and end in `.aspx` or `.pdf` are returned, in
/// document order and without repeats.
pub fn parse_links(html: &str, page_url: &Url, base_prefix: &str, selectors: &ContentSelectors) -> Vec<Link> {
    let document = Html::parse_document(html);
    let root = selectors.content_root(&document);

    let Some(anchor) = &selectors.anchor else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in root.select(anchor) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(absolute) = resolve_link(href, page_url) else {
            continue;
        };
        let Some(kind) = classify_link(&absolute, base_prefix) else {
            continue;
        };
        if seen.insert(absolute.clone()) {
            links.push(Link { url: absolute, kind });
        }
    }

    links
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only anchors
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
