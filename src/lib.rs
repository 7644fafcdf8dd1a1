//! vidtrawl: a polite video-content crawler
//!
//! This crate crawls a single web site for video-like content, follows
//! same-domain links down to a depth bound, reports live progress to a
//! supervising process, and can optionally fetch the discovered videos
//! through the external `yt-dlp` extractor.

pub mod config;
pub mod crawler;
pub mod media;
pub mod output;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vidtrawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Page fetch failures
///
/// Every variant is handled the same way by the crawl controller: the error
/// counter goes up, the message is reported and only that branch is dropped.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Redirect from {url} leaves the site: {location}")]
    OffSiteRedirect { url: String, location: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Request failed for {url}: {message}")]
    Request { url: String, message: String },
}

/// Reasons a matched element does not become a video candidate
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Element has no link")]
    MissingUrl,

    #[error("Link cannot be resolved to an absolute http(s) URL: {0}")]
    UnresolvableUrl(String),
}

/// Per-item failures from the external media extractor
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("yt-dlp failed: {0}")]
    Process(String),

    #[error("Failed to parse yt-dlp output: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for vidtrawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlJob};
pub use crawler::{Coordinator, VideoCandidate, VideoExtractor};
pub use state::{CrawlState, CrawlStatus};
