//! Crawler module for page fetching and video discovery
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a fixed client identity
//! - Heuristic video candidate extraction
//! - Link discovery and same-domain scoping
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod parser;

pub use coordinator::{run_crawl, Coordinator, CrawlReport, DOWNLOADS_DIR};
pub use extractor::{
    dedup_by_url, Heuristic, VideoCandidate, VideoExtractor, DEFAULT_HEURISTICS, MAX_TITLE_CHARS,
};
pub use fetcher::{build_http_client, fetch_page, FetchedPage};
pub use parser::{discover_links, discover_links_in, follow_targets};
