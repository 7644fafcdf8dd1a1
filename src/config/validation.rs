use crate::config::types::{Config, CrawlerConfig, DownloadConfig, MediaConfig};
use crate::ConfigError;

/// Deepest crawl the configuration accepts
const MAX_DEPTH_LIMIT: u32 = 16;

/// Upper bound on parallel downloads
const MAX_CONCURRENT_DOWNLOADS: usize = 32;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_download_config(&config.download)?;
    validate_media_config(&config.media)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_depth > MAX_DEPTH_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_depth must be <= {}, got {}",
            MAX_DEPTH_LIMIT, config.max_depth
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates download phase configuration
fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.concurrent < 1 || config.concurrent > MAX_CONCURRENT_DOWNLOADS {
        return Err(ConfigError::Validation(format!(
            "concurrent must be between 1 and {}, got {}",
            MAX_CONCURRENT_DOWNLOADS, config.concurrent
        )));
    }

    if config.max_videos < 1 {
        return Err(ConfigError::Validation(format!(
            "max_videos must be >= 1, got {}",
            config.max_videos
        )));
    }

    validate_quality(&config.quality)?;

    Ok(())
}

/// Validates external extractor configuration
fn validate_media_config(config: &MediaConfig) -> Result<(), ConfigError> {
    if config.ytdlp_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "ytdlp_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates a quality selector: "best", "worst", "<N>p" or "<N>kbps"
pub(crate) fn validate_quality(quality: &str) -> Result<(), ConfigError> {
    let q = quality.trim().to_ascii_lowercase();

    if q == "best" || q == "worst" {
        return Ok(());
    }

    let digits = q
        .strip_suffix("kbps")
        .or_else(|| q.strip_suffix('p'))
        .unwrap_or("");

    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        return Ok(());
    }

    Err(ConfigError::Validation(format!(
        "quality must be 'best', 'worst', '<N>p' or '<N>kbps', got '{}'",
        quality
    )))
}
