use crate::config::MediaFormat;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Watch page used when a bare video id is given instead of a URL
pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// Turns a bare video id into a watch page URL, passing URLs through
pub fn watch_url(target: &str) -> String {
    let target = target.trim();
    if target.contains("://") {
        target.to_string()
    } else {
        format!("{}{}", WATCH_URL_PREFIX, target)
    }
}

/// What to fetch and how
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRequest {
    /// Video id or page URL
    pub target: String,

    /// "best", "worst", "<N>p" or "<N>kbps"
    pub quality: String,

    pub format: MediaFormat,

    /// Exact output file (or yt-dlp template); overrides `output_dir`
    pub output_path: Option<PathBuf>,

    /// Directory receiving `<id>.<ext>` when no output path is given
    pub output_dir: Option<PathBuf>,
}

impl MediaRequest {
    pub fn new(target: impl Into<String>, quality: impl Into<String>, format: MediaFormat) -> Self {
        Self {
            target: target.into(),
            quality: quality.into(),
            format,
            output_path: None,
            output_dir: None,
        }
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Same settings, different target
    pub fn for_target(&self, target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..self.clone()
        }
    }

    /// The URL handed to the extractor
    pub fn source_url(&self) -> String {
        watch_url(&self.target)
    }

    /// The `-o` argument for yt-dlp
    pub fn output_template(&self) -> String {
        match (&self.output_path, &self.output_dir) {
            (Some(path), _) => path.to_string_lossy().into_owned(),
            (None, Some(dir)) => dir.join("%(id)s.%(ext)s").to_string_lossy().into_owned(),
            (None, None) => "%(id)s.%(ext)s".to_string(),
        }
    }

    /// Where the finished file is expected for media `id`
    pub fn expected_file(&self, id: &str) -> PathBuf {
        if let Some(path) = &self.output_path {
            return path.clone();
        }

        let name = format!("{}.{}", id, self.format.extension());
        match &self.output_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }
}

/// A finished download
#[derive(Debug, Clone, PartialEq)]
pub struct MediaDownload {
    pub video_id: String,
    pub title: Option<String>,
    pub duration: Option<f64>,
    pub file_path: PathBuf,
    pub file_size: u64,
    pub format: MediaFormat,
    pub quality: String,
}

/// Metadata printed by `yt-dlp --dump-json`
///
/// Only the fields in use are kept; anything missing falls back to a default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub formats: Option<Vec<IgnoredAny>>,
}

impl MediaInfo {
    /// Number of formats the extractor offers
    pub fn format_count(&self) -> usize {
        self.formats.as_ref().map_or(0, Vec::len)
    }
}

/// One transfer update, printed as a JSON line by the `download` command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TransferProgress {
    Downloading {
        percent: f64,
        downloaded_mb: f64,
        total_mb: f64,
        speed_mb: f64,
    },
    Finished,
}
