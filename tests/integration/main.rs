//! Integration tests for vidtrawl

mod crawl_tests;
mod download_tests;
