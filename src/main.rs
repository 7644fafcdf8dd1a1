//! vidtrawl main entry point
//!
//! Command-line interface for crawling a site for videos and for resolving
//! single videos through yt-dlp. Stdout carries machine-readable JSON lines;
//! logs go to stderr.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vidtrawl::config::{load_config_with_hash, validate, Config, CrawlJob, MediaFormat};
use vidtrawl::crawler::run_crawl;
use vidtrawl::media::{
    DownloadReport, InfoReport, MediaExtractor, MediaRequest, TransferProgress, YtDlp,
};

/// vidtrawl: a polite video-content crawler
///
/// Crawls a single site for video-like content, following same-domain
/// links down to a depth bound, and can download what it finds.
#[derive(Parser, Debug)]
#[command(name = "vidtrawl")]
#[command(version = "1.0.0")]
#[command(about = "A polite video-content crawler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site for videos, optionally downloading them
    Crawl(CrawlArgs),

    /// Download one video and print the result as JSON
    Download {
        /// Video id or URL
        video_id: String,

        /// "best", "worst", "<N>p" or "<N>kbps"
        quality: String,

        /// mp3 or mp4
        format: MediaFormat,

        /// Output file (defaults to <id>.<ext> in the current directory)
        output_path: Option<PathBuf>,

        /// Path or command name of the yt-dlp binary
        #[arg(long, default_value = "yt-dlp")]
        ytdlp_path: String,
    },

    /// Print a video's metadata as JSON without downloading
    Info {
        /// Video URL or id
        url: String,

        /// Path or command name of the yt-dlp binary
        #[arg(long, default_value = "yt-dlp")]
        ytdlp_path: String,
    },
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Page the crawl starts from
    #[arg(value_name = "BASE_URL")]
    base_url: String,

    /// Directory receiving progress.json, videos.json and downloads
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Identifier echoed in every progress record
    #[arg(short, long)]
    job_id: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the maximum link depth
    #[arg(long)]
    max_depth: Option<u32>,

    /// Download the discovered videos after crawling
    #[arg(long)]
    download: bool,

    /// Override the download quality
    #[arg(long)]
    quality: Option<String>,

    /// Override the download format
    #[arg(long)]
    format: Option<MediaFormat>,

    /// Override the number of downloads in flight
    #[arg(long)]
    concurrent: Option<usize>,

    /// Override the cap on downloaded videos
    #[arg(long)]
    max_videos: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Crawl(args) => handle_crawl(args).await,
        Command::Download {
            video_id,
            quality,
            format,
            output_path,
            ytdlp_path,
        } => handle_download(video_id, quality, format, output_path, ytdlp_path).await,
        Command::Info { url, ytdlp_path } => handle_info(url, ytdlp_path).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("vidtrawl=info,warn"),
            1 => EnvFilter::new("vidtrawl=debug,info"),
            2 => EnvFilter::new("vidtrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // stdout is reserved for JSON lines
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the effective configuration: file (or defaults) plus CLI overrides
fn resolve_config(args: &CrawlArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(max_depth) = args.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if args.download {
        config.download.enabled = true;
    }
    if let Some(quality) = &args.quality {
        config.download.quality = quality.clone();
    }
    if let Some(format) = args.format {
        config.download.format = format;
    }
    if let Some(concurrent) = args.concurrent {
        config.download.concurrent = concurrent;
    }
    if let Some(max_videos) = args.max_videos {
        config.download.max_videos = max_videos;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the crawl subcommand
async fn handle_crawl(args: CrawlArgs) -> Result<()> {
    let config = resolve_config(&args)?;

    let job_id = args
        .job_id
        .clone()
        .unwrap_or_else(|| format!("job-{}", chrono::Utc::now().format("%Y%m%d%H%M%S")));
    let job = CrawlJob::new(&args.base_url, args.output_dir.clone(), job_id)
        .with_context(|| format!("Invalid base URL {}", args.base_url))?;

    let extractor: Arc<dyn MediaExtractor> = Arc::new(YtDlp::from_config(&config.media));
    let report = run_crawl(config, job, extractor).await?;

    tracing::info!(
        "Run {} ended with status {}: {} pages visited, {} pages scraped, {} videos found, {} errors",
        report.state.job_id,
        report.state.status,
        report.pages_visited,
        report.state.pages_scraped,
        report.videos.len(),
        report.state.errors
    );

    if let Some(downloads) = &report.downloads {
        tracing::info!(
            "Downloads: {} attempted, {} succeeded, {} failed",
            downloads.attempted,
            downloads.succeeded,
            downloads.failed
        );
    }

    Ok(())
}

/// Handles the download subcommand
///
/// Always exits successfully; the printed JSON carries the outcome.
async fn handle_download(
    video_id: String,
    quality: String,
    format: MediaFormat,
    output_path: Option<PathBuf>,
    ytdlp_path: String,
) -> Result<()> {
    let ytdlp = YtDlp::new(ytdlp_path).with_progress_callback(Arc::new(print_progress));

    let mut request = MediaRequest::new(video_id.clone(), quality, format);
    if let Some(path) = output_path {
        request = request.with_output_path(path);
    }

    let result = ytdlp.download(&request).await;
    if let Err(e) = &result {
        tracing::error!("Download of {} failed: {}", video_id, e);
    }

    println!("{}", serde_json::to_string(&DownloadReport::from_result(&video_id, result))?);
    Ok(())
}

/// Handles the info subcommand
async fn handle_info(url: String, ytdlp_path: String) -> Result<()> {
    let ytdlp = YtDlp::new(ytdlp_path);
    let report = InfoReport::from_result(ytdlp.info(&url).await);
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn print_progress(progress: TransferProgress) {
    match serde_json::to_string(&progress) {
        Ok(line) => println!("{}", line),
        Err(e) => tracing::warn!("Failed to serialize transfer progress: {}", e),
    }
}
