//! JSON results of the `download` and `info` commands
//!
//! A caller always gets a well-formed object back: failures are reported in
//! the result itself, with safe placeholder values for display fields.

use crate::config::MediaFormat;
use crate::media::models::{MediaDownload, MediaInfo};
use crate::DownloadError;
use serde::Serialize;
use std::path::PathBuf;

/// Longest description kept in an info result, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// Title shown when metadata could not be fetched
pub const FALLBACK_TITLE: &str = "YouTube Video";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DownloadReport {
    Success {
        success: bool,
        video_id: String,
        title: String,
        duration: u64,
        file_path: PathBuf,
        file_size: u64,
        format: MediaFormat,
        quality: String,
    },
    Failure {
        success: bool,
        error: String,
        video_id: String,
    },
}

impl DownloadReport {
    /// `video_id` is the identifier the caller asked for
    pub fn from_result(video_id: &str, result: Result<MediaDownload, DownloadError>) -> Self {
        match result {
            Ok(download) => Self::Success {
                success: true,
                video_id: video_id.to_string(),
                title: download.title.unwrap_or_else(|| "Unknown".to_string()),
                duration: whole_seconds(download.duration),
                file_path: download.file_path,
                file_size: download.file_size,
                format: download.format,
                quality: download.quality,
            },
            Err(e) => Self::Failure {
                success: false,
                error: e.to_string(),
                video_id: video_id.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InfoReport {
    Success {
        success: bool,
        title: String,
        thumbnail: String,
        duration: u64,
        uploader: String,
        view_count: u64,
        like_count: u64,
        description: String,
        formats: usize,
        best_audio_format: MediaFormat,
        best_video_format: MediaFormat,
    },
    Failure {
        success: bool,
        error: String,
        title: String,
        thumbnail: String,
        duration: u64,
    },
}

impl InfoReport {
    pub fn from_result(result: Result<MediaInfo, DownloadError>) -> Self {
        match result {
            Ok(info) => {
                let formats = info.format_count();
                Self::Success {
                    success: true,
                    title: info.title.unwrap_or_else(|| "Unknown".to_string()),
                    thumbnail: info.thumbnail.unwrap_or_default(),
                    duration: whole_seconds(info.duration),
                    uploader: info.uploader.unwrap_or_default(),
                    view_count: info.view_count.unwrap_or(0),
                    like_count: info.like_count.unwrap_or(0),
                    description: info
                        .description
                        .unwrap_or_default()
                        .chars()
                        .take(MAX_DESCRIPTION_CHARS)
                        .collect(),
                    formats,
                    best_audio_format: MediaFormat::Mp3,
                    best_video_format: MediaFormat::Mp4,
                }
            }
            Err(e) => Self::Failure {
                success: false,
                error: e.to_string(),
                title: FALLBACK_TITLE.to_string(),
                thumbnail: String::new(),
                duration: 0,
            },
        }
    }
}

fn whole_seconds(duration: Option<f64>) -> u64 {
    match duration {
        Some(secs) if secs.is_finite() && secs > 0.0 => secs.round() as u64,
        _ => 0,
    }
}
