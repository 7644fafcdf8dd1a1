//! yt-dlp backed media extraction
//!
//! Metadata comes from `--dump-json`. Downloads run with `--newline` so every
//! progress update arrives as its own stdout line, which is parsed into a
//! [`TransferProgress`] and handed to the optional callback.

use crate::config::{MediaConfig, MediaFormat};
use crate::media::models::{watch_url, MediaDownload, MediaInfo, MediaRequest, TransferProgress};
use crate::media::MediaExtractor;
use crate::DownloadError;
use async_trait::async_trait;
use regex::Regex;
use std::process::Stdio;
use std::sync::{Arc, OnceLock};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

/// Receives every parsed transfer update of a download
pub type ProgressCallback = Arc<dyn Fn(TransferProgress) + Send + Sync>;

/// Audio bitrate used when the quality does not name one
pub const DEFAULT_AUDIO_KBPS: &str = "192";

// Example: [download]  12.5% of ~ 310.04MiB at  374.36KiB/s ETA 11:59
const PROGRESS_PATTERN: &str = r"\[download\]\s+(\d+(?:\.\d+)?)%\s+of\s+~?\s*(\d+(?:\.\d+)?)\s*([KMGT]?i?B)(?:\s+at\s+(\d+(?:\.\d+)?)\s*([KMGT]?i?B)/s)?";

/// The yt-dlp command line tool
#[derive(Clone)]
pub struct YtDlp {
    binary: String,
    progress_callback: Option<ProgressCallback>,
}

impl std::fmt::Debug for YtDlp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YtDlp")
            .field("binary", &self.binary)
            .field("progress_callback", &self.progress_callback.is_some())
            .finish()
    }
}

impl YtDlp {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            progress_callback: None,
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.ytdlp_path.clone())
    }

    /// Set a callback for transfer progress updates
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn notify(&self, progress: TransferProgress) {
        if let Some(callback) = &self.progress_callback {
            callback(progress);
        }
    }

    fn spawn_error(&self, error: std::io::Error) -> DownloadError {
        if error.kind() == std::io::ErrorKind::NotFound {
            DownloadError::ToolNotFound(self.binary.clone())
        } else {
            DownloadError::Io(error)
        }
    }
}

#[async_trait]
impl MediaExtractor for YtDlp {
    async fn download(&self, request: &MediaRequest) -> Result<MediaDownload, DownloadError> {
        let url = request.source_url();
        tracing::info!("Downloading {} as {} ({})", url, request.format, request.quality);

        let info = self.info(&url).await?;

        let args = download_args(request);
        tracing::debug!("Running {} {}", self.binary, args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        // Drained on its own task so a chatty stderr cannot block stdout
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf).await;
                buf
            })
        });

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                if let Some(progress) = parse_progress(&line) {
                    self.notify(progress);
                }
            }
        }

        let status = child.wait().await?;
        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if !status.success() {
            tracing::warn!("yt-dlp exited with {} for {}", status, url);
            return Err(DownloadError::Process(failure_message(&stderr, status)));
        }

        self.notify(TransferProgress::Finished);

        let video_id = if info.id.is_empty() {
            request.target.trim().to_string()
        } else {
            info.id.clone()
        };
        let file_path = request.expected_file(&video_id);
        let file_size = tokio::fs::metadata(&file_path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);

        tracing::info!("Downloaded {} ({} bytes)", file_path.display(), file_size);

        Ok(MediaDownload {
            video_id,
            title: info.title,
            duration: info.duration,
            file_path,
            file_size,
            format: request.format,
            quality: request.quality.clone(),
        })
    }

    async fn info(&self, target: &str) -> Result<MediaInfo, DownloadError> {
        let url = watch_url(target);

        let output = Command::new(&self.binary)
            .args(["--dump-json", "--no-playlist", "--no-warnings"])
            .arg(&url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DownloadError::Process(failure_message(
                &stderr,
                output.status,
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| DownloadError::Parse(format!("Invalid metadata JSON: {}", e)))
    }
}

/// yt-dlp arguments for a download request
pub fn download_args(request: &MediaRequest) -> Vec<String> {
    let mut args = vec![
        "--newline".to_string(),
        "--no-playlist".to_string(),
        "-f".to_string(),
        format_selector(request.format, &request.quality),
    ];

    if request.format == MediaFormat::Mp3 {
        args.extend([
            "-x".to_string(),
            "--audio-format".to_string(),
            "mp3".to_string(),
            "--audio-quality".to_string(),
            format!("{}K", audio_bitrate(&request.quality)),
        ]);
    }

    args.push("-o".to_string());
    args.push(request.output_template());
    args.push(request.source_url());
    args
}

/// The `-f` selector for a format and quality
///
/// | Format | Quality | Selector |
/// |--------|---------|----------|
/// | mp3 | any | `bestaudio/best` |
/// | mp4 | `720p` | `best[height<=720]/best` |
/// | mp4 | `best` / `worst` | unchanged |
pub fn format_selector(format: MediaFormat, quality: &str) -> String {
    if format == MediaFormat::Mp3 {
        return "bestaudio/best".to_string();
    }

    let quality = quality.trim().to_lowercase();
    match quality.strip_suffix('p') {
        Some(height) if !height.is_empty() && height.chars().all(|c| c.is_ascii_digit()) => {
            format!("best[height<={}]/best", height)
        }
        _ if quality == "worst" => "worst".to_string(),
        _ => "best".to_string(),
    }
}

/// Audio bitrate in kbps from a "<N>kbps" quality, else the default
pub fn audio_bitrate(quality: &str) -> String {
    let quality = quality.trim().to_lowercase();
    match quality.strip_suffix("kbps") {
        Some(kbps) if !kbps.is_empty() && kbps.chars().all(|c| c.is_ascii_digit()) => {
            kbps.to_string()
        }
        _ => DEFAULT_AUDIO_KBPS.to_string(),
    }
}

/// Parses one `--newline` progress line
pub fn parse_progress(line: &str) -> Option<TransferProgress> {
    static PROGRESS_RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = PROGRESS_RE
        .get_or_init(|| Regex::new(PROGRESS_PATTERN).ok())
        .as_ref()?;

    let caps = re.captures(line)?;
    let percent: f64 = caps.get(1)?.as_str().parse().ok()?;
    let total_mb = size_to_mb(caps.get(2)?.as_str(), caps.get(3)?.as_str())?;
    let speed_mb = match (caps.get(4), caps.get(5)) {
        (Some(value), Some(unit)) => size_to_mb(value.as_str(), unit.as_str()).unwrap_or(0.0),
        _ => 0.0,
    };

    Some(TransferProgress::Downloading {
        percent: round2(percent),
        downloaded_mb: round2(total_mb * percent / 100.0),
        total_mb: round2(total_mb),
        speed_mb: round2(speed_mb),
    })
}

fn size_to_mb(value: &str, unit: &str) -> Option<f64> {
    let value: f64 = value.parse().ok()?;
    let bytes_per_unit = match unit {
        "B" => 1.0,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "TiB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        "KB" => 1e3,
        "MB" => 1e6,
        "GB" => 1e9,
        "TB" => 1e12,
        _ => return None,
    };
    Some(value * bytes_per_unit / (1024.0 * 1024.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn failure_message(stderr: &str, status: std::process::ExitStatus) -> String {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR"))
        .or_else(|| lines.last())
        .map(|l| l.to_string())
        .unwrap_or_else(|| format!("yt-dlp exited with {}", status))
}
