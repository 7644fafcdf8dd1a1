use crate::{UrlError, UrlResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

/// Browser-like identity sent with every page request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for vidtrawl
///
/// Every section is optional in the TOML file; missing sections and keys
/// fall back to their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub media: MediaConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link depth to follow from the base URL (root page is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Pause before each page fetch after the first (milliseconds)
    #[serde(rename = "courtesy-delay-ms")]
    pub courtesy_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            courtesy_delay_ms: 500,
            request_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Optional download phase configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Run the download phase after the crawl
    pub enabled: bool,

    /// Quality selector passed to the extractor ("best", "720p", "192kbps", ...)
    pub quality: String,

    /// Target container for downloaded media
    pub format: MediaFormat,

    /// Maximum number of downloads in flight at once
    pub concurrent: usize,

    /// Cap on how many of the earliest-discovered videos get downloaded
    #[serde(rename = "max-videos")]
    pub max_videos: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            quality: "best".to_string(),
            format: MediaFormat::Mp4,
            concurrent: 3,
            max_videos: 20,
        }
    }
}

/// External extractor configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path or command name of the yt-dlp binary
    #[serde(rename = "ytdlp-path")]
    pub ytdlp_path: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
        }
    }
}

/// Target media container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    /// Audio only, converted to mp3
    Mp3,
    /// Muxed video
    Mp4,
}

impl MediaFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for MediaFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" | "audio" => Ok(Self::Mp3),
            "mp4" | "video" => Ok(Self::Mp4),
            other => Err(format!("unknown media format '{}', expected mp3 or mp4", other)),
        }
    }
}

/// Run-scoped inputs for a single crawl
#[derive(Debug, Clone)]
pub struct CrawlJob {
    /// The page the crawl starts from; also defines the crawl's domain
    pub base_url: Url,

    /// Directory receiving progress.json, videos.json and downloads
    pub output_dir: PathBuf,

    /// Identifier echoed in every progress record
    pub job_id: String,
}

impl CrawlJob {
    /// Creates a job, rejecting base URLs that cannot be crawled
    ///
    /// # Examples
    ///
    /// ```
    /// use vidtrawl::config::CrawlJob;
    ///
    /// let job = CrawlJob::new("http://example.com", "./out", "job-1").unwrap();
    /// assert_eq!(job.base_url.as_str(), "http://example.com/");
    ///
    /// assert!(CrawlJob::new("ftp://example.com", "./out", "job-1").is_err());
    /// ```
    pub fn new(
        base_url: &str,
        output_dir: impl Into<PathBuf>,
        job_id: impl Into<String>,
    ) -> UrlResult<Self> {
        let url = Url::parse(base_url).map_err(|e| UrlError::Parse(e.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS schemes are supported, got: {}",
                url.scheme()
            )));
        }

        if url.host_str().is_none() {
            return Err(UrlError::MissingDomain);
        }

        Ok(Self {
            base_url: url,
            output_dir: output_dir.into(),
            job_id: job_id.into(),
        })
    }
}
