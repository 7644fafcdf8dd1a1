//! Heuristic video candidate extraction
//!
//! Page markup is unknown and uncontrolled, so extraction is a list of loose
//! structural guesses tried in order. The first heuristic that yields at
//! least one candidate wins the page; later heuristics are not applied to
//! that page. Every candidate must carry a resolvable URL, which filters out
//! most false positives.

use crate::url::resolve_link;
use crate::ExtractionError;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Longest title kept on a candidate, in characters
pub const MAX_TITLE_CHARS: usize = 200;

/// Container patterns tried in order, as (name, CSS selector)
pub const DEFAULT_HEURISTICS: &[(&str, &str)] = &[
    ("video-item", "div.video-item"),
    ("video-article", "article.video"),
    ("video-container", "div.video-container"),
    ("video-link", r#"a[href*="video"], a[href*="watch"]"#),
    ("video-data-type", r#"div[data-type="video"]"#),
];

const LINK_SELECTOR: &str = "a[href]";
const TITLE_SELECTOR: &str = "h1, h2, h3, h4, h5, h6, a, span, div";
const IMAGE_SELECTOR: &str = "img";
const DURATION_SELECTOR: &str = "time, span, div";
const VIEWS_SELECTOR: &str = "span, div";
const DURATION_HINTS: &[&str] = &["duration", "time", "length"];
const VIEWS_HINTS: &[&str] = &["view", "watch"];

/// A video-like item found on a page, not yet verified playable
///
/// Identity is `url`. Candidates are only built by the extractor and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoCandidate {
    /// Absolute URL of the video or its page
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Absolute URL of the preview image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    /// Duration text as shown on the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    /// View count text as shown on the page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<String>,

    pub scraped_at: DateTime<Utc>,
}

/// One structural guess at what a video container looks like
#[derive(Debug, Clone)]
pub struct Heuristic {
    pub name: &'static str,
    selector: Selector,
}

/// Descendant lookups used to fill in a candidate's fields
#[derive(Debug, Clone)]
struct FieldSelectors {
    link: Option<Selector>,
    title: Option<Selector>,
    image: Option<Selector>,
    duration: Option<Selector>,
    views: Option<Selector>,
}

impl FieldSelectors {
    fn parse() -> Self {
        Self {
            link: Selector::parse(LINK_SELECTOR).ok(),
            title: Selector::parse(TITLE_SELECTOR).ok(),
            image: Selector::parse(IMAGE_SELECTOR).ok(),
            duration: Selector::parse(DURATION_SELECTOR).ok(),
            views: Selector::parse(VIEWS_SELECTOR).ok(),
        }
    }
}

/// Applies the ordered heuristics to pages
#[derive(Debug, Clone)]
pub struct VideoExtractor {
    heuristics: Vec<Heuristic>,
    fields: FieldSelectors,
}

impl Default for VideoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoExtractor {
    /// Creates an extractor with [`DEFAULT_HEURISTICS`]
    pub fn new() -> Self {
        Self::with_heuristics(DEFAULT_HEURISTICS)
    }

    /// Creates an extractor from (name, CSS selector) pairs, in priority order
    ///
    /// Selectors that fail to parse are logged and skipped.
    pub fn with_heuristics(patterns: &[(&'static str, &str)]) -> Self {
        let heuristics = patterns
            .iter()
            .filter_map(|&(name, css)| match Selector::parse(css) {
                Ok(selector) => Some(Heuristic { name, selector }),
                Err(e) => {
                    tracing::warn!("Ignoring heuristic {} ({}): {:?}", name, css, e);
                    None
                }
            })
            .collect();

        Self {
            heuristics,
            fields: FieldSelectors::parse(),
        }
    }

    pub fn heuristics(&self) -> &[Heuristic] {
        &self.heuristics
    }

    /// Extracts the candidates on a page, deduplicated by URL
    ///
    /// # Example
    ///
    /// ```
    /// use url::Url;
    /// use vidtrawl::crawler::VideoExtractor;
    ///
    /// let html = r#"<div class="video-item"><a href="/v/1">Title</a></div>"#;
    /// let page = Url::parse("http://example.com").unwrap();
    /// let videos = VideoExtractor::new().extract(html, &page);
    /// assert_eq!(videos[0].url, "http://example.com/v/1");
    /// assert_eq!(videos[0].title.as_deref(), Some("Title"));
    /// ```
    pub fn extract(&self, html: &str, page_url: &Url) -> Vec<VideoCandidate> {
        let document = Html::parse_document(html);
        self.extract_from(&document, page_url)
    }

    /// Same as [`VideoExtractor::extract`] over an already parsed document
    pub fn extract_from(&self, document: &Html, page_url: &Url) -> Vec<VideoCandidate> {
        for heuristic in &self.heuristics {
            let candidates: Vec<VideoCandidate> = document
                .select(&heuristic.selector)
                .filter_map(|element| match self.extract_candidate(element, page_url) {
                    Ok(candidate) => Some(candidate),
                    Err(e) => {
                        tracing::trace!("Dropping {} match on {}: {}", heuristic.name, page_url, e);
                        None
                    }
                })
                .collect();

            if !candidates.is_empty() {
                tracing::debug!(
                    "Heuristic {} matched {} candidates on {}",
                    heuristic.name,
                    candidates.len(),
                    page_url
                );
                return dedup_by_url(candidates);
            }
        }

        Vec::new()
    }

    /// Builds a candidate from one matched container element
    ///
    /// # Field Sources
    ///
    /// | Field | Source |
    /// |-------|--------|
    /// | url | first descendant `a[href]`, else the element's own href |
    /// | title | first descendant heading/a/span/div with text, else own text |
    /// | thumbnail | first descendant `img` with `src` (or `data-src`) |
    /// | duration | first descendant time/span/div classed duration/time/length |
    /// | views | first descendant span/div classed view/watch |
    pub fn extract_candidate(
        &self,
        element: ElementRef<'_>,
        page_url: &Url,
    ) -> Result<VideoCandidate, ExtractionError> {
        let fields = &self.fields;
        let href =
            candidate_href(element, fields.link.as_ref()).ok_or(ExtractionError::MissingUrl)?;
        let url = resolve_link(href, page_url)
            .ok_or_else(|| ExtractionError::UnresolvableUrl(href.trim().to_string()))?;

        let title = first_match(element, fields.title.as_ref(), |e| text_of(e).is_some())
            .and_then(|e| text_of(&e))
            .or_else(|| text_of(&element))
            .map(|t| truncate_chars(&t, MAX_TITLE_CHARS));

        let thumbnail = first_match(element, fields.image.as_ref(), |e| image_source(e).is_some())
            .and_then(|img| image_source(&img))
            .and_then(|src| resolve_link(src, page_url))
            .map(|u| u.to_string());

        let duration = first_match(element, fields.duration.as_ref(), |e| {
            class_mentions(e, DURATION_HINTS)
        })
        .and_then(|e| text_of(&e));

        let views = first_match(element, fields.views.as_ref(), |e| class_mentions(e, VIEWS_HINTS))
            .and_then(|e| text_of(&e));

        Ok(VideoCandidate {
            url: url.to_string(),
            title,
            thumbnail,
            duration,
            views,
            scraped_at: Utc::now(),
        })
    }
}

/// Keeps the first candidate for every URL, preserving order
pub fn dedup_by_url(candidates: Vec<VideoCandidate>) -> Vec<VideoCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.url.clone()))
        .collect()
}

fn candidate_href<'a>(element: ElementRef<'a>, link: Option<&Selector>) -> Option<&'a str> {
    if let Some(anchor) = first_match(element, link, |_| true) {
        return anchor.value().attr("href");
    }

    if element.value().name() == "a" {
        return element.value().attr("href");
    }

    None
}

/// First descendant (not the element itself) matching `selector` and `accept`
fn first_match<'a>(
    element: ElementRef<'a>,
    selector: Option<&Selector>,
    accept: impl Fn(&ElementRef<'a>) -> bool,
) -> Option<ElementRef<'a>> {
    element.select(selector?).find(|e| accept(e))
}

/// Whitespace-collapsed text content, None when blank
fn text_of(element: &ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<Vec<_>>().join(" ");
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

fn image_source<'a>(img: &ElementRef<'a>) -> Option<&'a str> {
    img.value()
        .attr("src")
        .or_else(|| img.value().attr("data-src"))
        .filter(|s| !s.trim().is_empty())
}

fn class_mentions(element: &ElementRef<'_>, hints: &[&str]) -> bool {
    match element.value().attr("class") {
        Some(class) => {
            let class = class.to_lowercase();
            hints.iter().any(|hint| class.contains(hint))
        }
        None => false,
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
