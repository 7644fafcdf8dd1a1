//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler, including:
//! - Building the HTTP client with the fixed browser identity and timeout
//! - GET requests returning raw page markup and the URL it was served from
//! - Error classification into [`FetchError`]

use crate::config::CrawlerConfig;
use crate::url::netloc;
use crate::FetchError;
use reqwest::{header::LOCATION, redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Redirect hops followed before a fetch is abandoned
const MAX_REDIRECTS: usize = 10;

/// A fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Where the body was served from, after redirects
    pub url: Url,
    pub body: String,
}

/// Builds the HTTP client shared by every fetch in a run
///
/// # Arguments
///
/// * `config` - The crawler configuration (user agent and timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use vidtrawl::config::CrawlerConfig;
/// use vidtrawl::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(same_site_redirects())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Follows redirects only while they stay on the requested host and port
///
/// A hop to another netloc is not requested; the redirect response itself is
/// handed back to [`fetch_page`].
fn same_site_redirects() -> Policy {
    Policy::custom(|attempt| {
        let leaves_site = attempt
            .previous()
            .first()
            .is_some_and(|origin| netloc(origin) != netloc(attempt.url()));

        if leaves_site {
            attempt.stop()
        } else if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else {
            attempt.follow()
        }
    })
}

/// Fetches a page and returns its markup
///
/// # Error Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Ok(FetchedPage)` |
/// | Redirect to another host | `FetchError::OffSiteRedirect` |
/// | Any other status | `FetchError::Status` |
/// | Timeout | `FetchError::Timeout` |
/// | Connection refused / DNS | `FetchError::Connect` |
/// | Body read or other failure | `FetchError::Request` |
pub async fn fetch_page(client: &Client, url: &Url) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    let location = response.headers().get(LOCATION).and_then(|v| v.to_str().ok());
    if let (true, Some(location)) = (status.is_redirection(), location) {
        return Err(FetchError::OffSiteRedirect {
            url: url.to_string(),
            location: location.to_string(),
        });
    }
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().clone();
    let body = response.text().await.map_err(|e| classify_error(url, e))?;

    Ok(FetchedPage {
        url: final_url,
        body,
    })
}

fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
