//! Media download through an external extractor
//!
//! This module handles:
//! - The [`MediaExtractor`] seam and its `yt-dlp` implementation
//! - Bounded-parallel downloading of crawl results
//! - The JSON result shapes of the `download` and `info` commands

mod coordinator;
mod models;
mod report;
mod ytdlp;

pub use coordinator::{DownloadCoordinator, DownloadOutcome, DownloadSummary};
pub use models::{watch_url, MediaDownload, MediaInfo, MediaRequest, TransferProgress};
pub use report::{DownloadReport, InfoReport, FALLBACK_TITLE, MAX_DESCRIPTION_CHARS};
pub use ytdlp::{
    audio_bitrate, download_args, format_selector, parse_progress, ProgressCallback, YtDlp,
};

use crate::DownloadError;
use async_trait::async_trait;

/// Fetches media and metadata for a video page or identifier
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Downloads one item as described by `request`
    async fn download(&self, request: &MediaRequest) -> Result<MediaDownload, DownloadError>;

    /// Fetches metadata only
    async fn info(&self, target: &str) -> Result<MediaInfo, DownloadError>;
}
