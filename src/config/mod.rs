//! Configuration module for vidtrawl
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, plus the run-scoped job inputs (base URL, output
//! directory, job id) that come from the command line.
//!
//! # Example
//!
//! ```no_run
//! use vidtrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("vidtrawl.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlJob, CrawlerConfig, DownloadConfig, MediaConfig, MediaFormat, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
