//! Link discovery for recursive crawling
//!
//! This module handles finding the anchors on a page and deciding which of
//! them the controller should follow:
//! - Resolve every `<a href>` against the page URL
//! - Keep only targets on the run's network location
//! - Drop image/video/audio/pdf targets
//! - Strip fragments so `page#a` and `page#b` are one page

use crate::url::{has_media_extension, is_same_domain, resolve_link, strip_fragment};
use scraper::{Html, Selector};
use url::Url;

/// Extracts all resolvable anchor targets from a page, in document order
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only links
///
/// # Example
///
/// ```
/// use vidtrawl::crawler::discover_links;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let links = discover_links(html, &base_url);
/// assert_eq!(links[0].as_str(), "https://example.com/page");
/// ```
pub fn discover_links(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    discover_links_in(&document, page_url)
}

/// Same as [`discover_links`] over an already parsed document
pub fn discover_links_in(document: &Html, page_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, page_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Narrows discovered links to the targets worth recursing into
///
/// Keeps the input order and drops:
/// - targets whose network location differs from `base_url`'s
/// - targets whose path ends in a known non-page extension
pub fn follow_targets(links: Vec<Url>, base_url: &Url) -> Vec<Url> {
    links
        .into_iter()
        .filter(|link| {
            if !is_same_domain(link, base_url) {
                tracing::trace!("Skipping cross-domain link {}", link);
                return false;
            }
            if has_media_extension(link) {
                tracing::trace!("Skipping media link {}", link);
                return false;
            }
            true
        })
        .map(|link| strip_fragment(&link))
        .collect()
}
