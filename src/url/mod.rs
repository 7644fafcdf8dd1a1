//! URL handling module for vidtrawl
//!
//! This module provides link resolution, same-domain scoping and the
//! non-page extension filter used when deciding which links to follow.

mod domain;
mod filter;

// Re-export main functions
pub use domain::{is_same_domain, netloc};
pub use filter::{has_media_extension, strip_fragment, MEDIA_EXTENSIONS};

use url::Url;

/// Resolves a link href to an absolute http(s) URL
///
/// Returns None if the link should be excluded:
/// - empty hrefs
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links (same page anchors)
/// - hrefs that fail to join against the base
/// - non-HTTP(S) URLs after resolution
///
/// # Examples
///
/// ```
/// use url::Url;
/// use vidtrawl::url::resolve_link;
///
/// let base = Url::parse("http://example.com/videos/").unwrap();
/// assert_eq!(
///     resolve_link("/v/1", &base).map(|u| u.to_string()),
///     Some("http://example.com/v/1".to_string())
/// );
/// assert_eq!(resolve_link("mailto:me@example.com", &base), None);
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
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

    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
