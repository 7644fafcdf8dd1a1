//! Integration tests for the download phase

use crate::helpers::{candidate, FakeExtractor, SharedBuffer};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use vidtrawl::config::MediaFormat;
use vidtrawl::media::{DownloadCoordinator, MediaRequest};
use vidtrawl::output::ProgressReporter;

fn candidates(count: usize) -> Vec<vidtrawl::VideoCandidate> {
    (1..=count)
        .map(|i| candidate(&format!("http://example.com/v/{}", i)))
        .collect()
}

#[tokio::test]
async fn test_concurrency_cap_is_respected() {
    let dir = TempDir::new().unwrap();
    let buffer = SharedBuffer::default();
    let mut reporter = ProgressReporter::new(dir.path(), "dl", Box::new(buffer.clone()));

    let fake = Arc::new(FakeExtractor::with_delay(Duration::from_millis(50)));
    let coordinator = DownloadCoordinator::new(
        fake.clone(),
        3,
        MediaRequest::new("", "720p", MediaFormat::Mp4),
    );

    let summary = coordinator.run(&candidates(5), &mut reporter).await;

    assert_eq!(fake.calls(), 5);
    assert_eq!(fake.max_in_flight(), 3);
    assert_eq!(summary.attempted, 5);
    assert_eq!(summary.succeeded + summary.failed, 5);
    assert_eq!(summary.outcomes.len(), 5);
    assert_eq!(reporter.state().videos_downloaded, 5);

    // One progress line per completion, counted up one at a time
    let downloaded: Vec<u64> = buffer
        .lines()
        .iter()
        .map(|l| l["videos_downloaded"].as_u64().unwrap())
        .collect();
    assert_eq!(downloaded, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_single_slot_runs_sequentially() {
    let dir = TempDir::new().unwrap();
    let mut reporter = ProgressReporter::new(dir.path(), "dl", Box::new(std::io::sink()));

    let fake = Arc::new(FakeExtractor::with_delay(Duration::from_millis(10)));
    let coordinator =
        DownloadCoordinator::new(fake.clone(), 1, MediaRequest::new("", "best", MediaFormat::Mp4));
    coordinator.run(&candidates(4), &mut reporter).await;

    assert_eq!(fake.max_in_flight(), 1);
    let targets = fake.targets.lock().unwrap().clone();
    assert_eq!(
        targets,
        vec![
            "http://example.com/v/1",
            "http://example.com/v/2",
            "http://example.com/v/3",
            "http://example.com/v/4",
        ]
    );
}

#[tokio::test]
async fn test_failures_are_isolated() {
    let dir = TempDir::new().unwrap();
    let mut reporter = ProgressReporter::new(dir.path(), "dl", Box::new(std::io::sink()));

    let fake = Arc::new(FakeExtractor::with_delay(Duration::from_millis(5)).failing_on("/v/2"));
    let coordinator =
        DownloadCoordinator::new(fake.clone(), 3, MediaRequest::new("", "best", MediaFormat::Mp3));
    let summary = coordinator.run(&candidates(5), &mut reporter).await;

    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.failed, 1);
    assert_eq!(reporter.state().videos_downloaded, 4);
    assert_eq!(reporter.state().errors, 1);
    assert!(reporter
        .state()
        .last_error
        .as_deref()
        .unwrap()
        .contains("/v/2"));

    let failed: Vec<&str> = summary
        .outcomes
        .iter()
        .filter(|o| o.result.is_err())
        .map(|o| o.url.as_str())
        .collect();
    assert_eq!(failed, vec!["http://example.com/v/2"]);
}
