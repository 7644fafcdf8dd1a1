//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlStatus`: the phase the run is in (starting, scraping_page, ...)
//! - `CrawlState`: counters and the latest page/error for the whole run
//! - `ProgressUpdate`: a partial update merged into `CrawlState`

mod crawl_state;

// Re-export main types
pub use crawl_state::{CrawlState, CrawlStatus, ProgressUpdate};
