//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties together:
//! - Depth-first traversal from the base URL over an explicit work stack
//! - Page fetching, candidate extraction and link discovery
//! - Progress reporting and result snapshots after every page
//! - The optional download phase
//!
//! Pages are fetched one at a time with a fixed courtesy delay between them.
//! A failed page only abandons its own branch.

use crate::config::{Config, CrawlJob};
use crate::crawler::extractor::{VideoCandidate, VideoExtractor};
use crate::crawler::parser::{discover_links_in, follow_targets};
use crate::crawler::{build_http_client, fetch_page};
use crate::media::{DownloadCoordinator, DownloadSummary, MediaExtractor, MediaRequest};
use crate::output::{ProgressReporter, ResultStore};
use crate::state::{CrawlState, CrawlStatus, ProgressUpdate};
use crate::url::strip_fragment;
use crate::TrawlError;
use reqwest::Client;
use scraper::Html;
use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Subdirectory of the output directory receiving downloaded media
pub const DOWNLOADS_DIR: &str = "downloads";

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    job: CrawlJob,
    client: Client,
    extractor: VideoExtractor,
    reporter: ProgressReporter,
    results: ResultStore,
    visited: HashSet<String>,
    seen_videos: HashSet<String>,
    videos: Vec<VideoCandidate>,
}

/// Final numbers of a run
#[derive(Debug)]
pub struct CrawlReport {
    pub state: CrawlState,
    pub pages_visited: usize,
    pub videos: Vec<VideoCandidate>,
    pub downloads: Option<DownloadSummary>,
}

impl Coordinator {
    /// Creates a coordinator writing progress lines to stdout
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to crawl, `starting` already reported
    /// * `Err(TrawlError)` - Output directory or HTTP client unavailable
    pub fn new(config: Config, job: CrawlJob) -> Result<Self, TrawlError> {
        Self::with_writer(config, job, Box::new(std::io::stdout()))
    }

    /// Creates a coordinator writing progress lines to `writer`
    pub fn with_writer(
        config: Config,
        job: CrawlJob,
        writer: Box<dyn Write + Send>,
    ) -> Result<Self, TrawlError> {
        std::fs::create_dir_all(&job.output_dir).map_err(|source| TrawlError::OutputDir {
            path: job.output_dir.clone(),
            source,
        })?;

        let client = build_http_client(&config.crawler)?;
        let mut reporter = ProgressReporter::new(&job.output_dir, job.job_id.clone(), writer);
        let results = ResultStore::new(&job.output_dir);

        reporter.report(ProgressUpdate::new().status(CrawlStatus::Starting));

        Ok(Self {
            config,
            job,
            client,
            extractor: VideoExtractor::new(),
            reporter,
            results,
            visited: HashSet::new(),
            seen_videos: HashSet::new(),
            videos: Vec::new(),
        })
    }

    /// Crawls from the base URL down to the configured depth
    ///
    /// Children are pushed in reverse so the first link on a page is fully
    /// explored before its next sibling.
    pub async fn crawl(&mut self) {
        let max_depth = self.config.crawler.max_depth;
        let delay = Duration::from_millis(self.config.crawler.courtesy_delay_ms);

        tracing::info!(
            "Starting crawl of {} (max depth {})",
            self.job.base_url,
            max_depth
        );

        let mut stack: Vec<(Url, u32)> = vec![(strip_fragment(&self.job.base_url), 0)];

        while let Some((url, depth)) = stack.pop() {
            if depth > max_depth || self.visited.contains(url.as_str()) {
                continue;
            }
            self.visited.insert(url.to_string());

            if depth > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            self.reporter.report(
                ProgressUpdate::new()
                    .status(CrawlStatus::ScrapingPage)
                    .current_url(url.as_str()),
            );
            tracing::debug!("Fetching {} (depth {})", url, depth);

            let page = match fetch_page(&self.client, &url).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Failed to fetch {}: {}", url, e);
                    let errors = self.reporter.state().errors + 1;
                    self.reporter.report(
                        ProgressUpdate::new()
                            .errors(errors)
                            .last_error(e.to_string()),
                    );
                    continue;
                }
            };

            // Relative links resolve against where the page was served from
            let served_from = strip_fragment(&page.url);
            if served_from != url {
                tracing::debug!("{} redirected to {}", url, served_from);
                self.visited.insert(served_from.to_string());
            }

            let (found, links) = self.scan_page(&page.body, &served_from, depth < max_depth);
            let added = self.record_videos(found);

            let pages = self.reporter.state().pages_scraped + 1;
            self.reporter.report(
                ProgressUpdate::new()
                    .pages_scraped(pages)
                    .videos_found(self.videos.len() as u64),
            );
            self.results.save(&self.videos);

            tracing::debug!(
                "{}: {} new videos, {} links to follow",
                url,
                added,
                links.len()
            );

            for link in links.into_iter().rev() {
                stack.push((link, depth + 1));
            }
        }

        tracing::info!(
            "Crawl finished: {} pages visited, {} videos found",
            self.visited.len(),
            self.videos.len()
        );
    }

    /// Extracts candidates and, if asked, the links worth following
    fn scan_page(&self, html: &str, url: &Url, with_links: bool) -> (Vec<VideoCandidate>, Vec<Url>) {
        let document = Html::parse_document(html);
        let found = self.extractor.extract_from(&document, url);
        let links = if with_links {
            follow_targets(discover_links_in(&document, url), &self.job.base_url)
        } else {
            Vec::new()
        };
        (found, links)
    }

    /// Appends the candidates not seen earlier in the run
    fn record_videos(&mut self, found: Vec<VideoCandidate>) -> usize {
        let before = self.videos.len();
        for candidate in found {
            if self.seen_videos.insert(candidate.url.clone()) {
                self.videos.push(candidate);
            }
        }
        self.videos.len() - before
    }

    /// Downloads the earliest-discovered candidates
    ///
    /// Returns None, after reporting `no_videos_found`, if the crawl found
    /// nothing.
    pub async fn download_videos(
        &mut self,
        extractor: Arc<dyn MediaExtractor>,
    ) -> Option<DownloadSummary> {
        self.reporter
            .report(ProgressUpdate::new().status(CrawlStatus::DownloadingVideos));

        if self.videos.is_empty() {
            tracing::info!("No videos found, nothing to download");
            self.reporter
                .report(ProgressUpdate::new().status(CrawlStatus::NoVideosFound));
            return None;
        }

        self.reporter
            .report(ProgressUpdate::new().total_to_download(self.videos.len() as u64));

        let download = &self.config.download;
        let template = MediaRequest::new("", download.quality.clone(), download.format)
            .with_output_dir(self.job.output_dir.join(DOWNLOADS_DIR));
        let coordinator = DownloadCoordinator::new(extractor, download.concurrent, template);

        let batch = &self.videos[..self.videos.len().min(download.max_videos)];
        Some(coordinator.run(batch, &mut self.reporter).await)
    }

    /// Marks the run completed
    pub fn finish(&mut self) {
        self.reporter
            .report(ProgressUpdate::new().status(CrawlStatus::Completed));
    }

    /// Discovered candidates, in discovery order
    pub fn videos(&self) -> &[VideoCandidate] {
        &self.videos
    }

    /// Every URL a fetch was attempted for
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    pub fn state(&self) -> &CrawlState {
        self.reporter.state()
    }

    fn into_report(self, downloads: Option<DownloadSummary>) -> CrawlReport {
        CrawlReport {
            state: self.reporter.state().clone(),
            pages_visited: self.visited.len(),
            videos: self.videos,
            downloads,
        }
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for a run. It will:
/// 1. Create the output directory and report `starting`
/// 2. Crawl the site
/// 3. Download the findings, if enabled in the configuration
/// 4. Report `completed`, unless the download phase ended with
///    `no_videos_found`
pub async fn run_crawl(
    config: Config,
    job: CrawlJob,
    extractor: Arc<dyn MediaExtractor>,
) -> Result<CrawlReport, TrawlError> {
    let download_enabled = config.download.enabled;
    let mut coordinator = Coordinator::new(config, job)?;

    coordinator.crawl().await;

    let downloads = if download_enabled {
        coordinator.download_videos(extractor).await
    } else {
        None
    };

    if !coordinator.state().status.is_final() {
        coordinator.finish();
    }

    Ok(coordinator.into_report(downloads))
}
