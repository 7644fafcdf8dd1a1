//! Run-state definitions for tracking crawl progress
//!
//! A single `CrawlState` exists per run. It only ever changes through
//! `CrawlState::apply`, which the progress reporter calls for every update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase the run is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStatus {
    /// Run created, nothing fetched yet
    Starting,

    /// A page fetch is in progress (see `current_url`)
    ScrapingPage,

    /// Download phase has started
    DownloadingVideos,

    /// Download phase was requested but the crawl found nothing
    NoVideosFound,

    /// Run finished
    Completed,
}

impl CrawlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::ScrapingPage => "scraping_page",
            Self::DownloadingVideos => "downloading_videos",
            Self::NoVideosFound => "no_videos_found",
            Self::Completed => "completed",
        }
    }

    /// Returns true if no further state transitions are expected
    pub fn is_final(&self) -> bool {
        matches!(self, Self::NoVideosFound | Self::Completed)
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full run state, as emitted on the progress stream and in progress.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlState {
    pub job_id: String,
    pub status: CrawlStatus,
    pub pages_scraped: u64,
    pub videos_found: u64,
    pub videos_downloaded: u64,
    pub errors: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_to_download: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub start_time: DateTime<Utc>,
    pub current_time: DateTime<Utc>,
}

impl CrawlState {
    pub fn new(job_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            job_id: job_id.into(),
            status: CrawlStatus::Starting,
            pages_scraped: 0,
            videos_found: 0,
            videos_downloaded: 0,
            errors: 0,
            total_to_download: None,
            current_url: None,
            last_error: None,
            start_time: now,
            current_time: now,
        }
    }

    /// Merges the fields present in `update` and stamps `current_time`
    ///
    /// Counters never move backwards: a counter value lower than the
    /// current one is ignored.
    pub fn apply(&mut self, update: ProgressUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(url) = update.current_url {
            self.current_url = Some(url);
        }
        if let Some(error) = update.last_error {
            self.last_error = Some(error);
        }
        if let Some(total) = update.total_to_download {
            self.total_to_download = Some(total);
        }

        merge_counter(&mut self.pages_scraped, update.pages_scraped);
        merge_counter(&mut self.videos_found, update.videos_found);
        merge_counter(&mut self.videos_downloaded, update.videos_downloaded);
        merge_counter(&mut self.errors, update.errors);

        self.current_time = Utc::now();
    }
}

fn merge_counter(current: &mut u64, new: Option<u64>) {
    if let Some(value) = new {
        *current = (*current).max(value);
    }
}

/// A partial state update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressUpdate {
    pub status: Option<CrawlStatus>,
    pub current_url: Option<String>,
    pub pages_scraped: Option<u64>,
    pub videos_found: Option<u64>,
    pub videos_downloaded: Option<u64>,
    pub errors: Option<u64>,
    pub last_error: Option<String>,
    pub total_to_download: Option<u64>,
}

impl ProgressUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: CrawlStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn current_url(mut self, url: impl Into<String>) -> Self {
        self.current_url = Some(url.into());
        self
    }

    pub fn pages_scraped(mut self, count: u64) -> Self {
        self.pages_scraped = Some(count);
        self
    }

    pub fn videos_found(mut self, count: u64) -> Self {
        self.videos_found = Some(count);
        self
    }

    pub fn videos_downloaded(mut self, count: u64) -> Self {
        self.videos_downloaded = Some(count);
        self
    }

    pub fn errors(mut self, count: u64) -> Self {
        self.errors = Some(count);
        self
    }

    pub fn last_error(mut self, message: impl Into<String>) -> Self {
        self.last_error = Some(message.into());
        self
    }

    pub fn total_to_download(mut self, count: u64) -> Self {
        self.total_to_download = Some(count);
        self
    }
}
