//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use crate::helpers::{html_page, test_config, FakeExtractor, SharedBuffer};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use vidtrawl::config::CrawlJob;
use vidtrawl::crawler::{run_crawl, Coordinator};
use vidtrawl::media::MediaExtractor;
use vidtrawl::output::{ResultStore, PROGRESS_FILE, RESULTS_FILE};
use vidtrawl::state::{CrawlState, CrawlStatus};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn coordinator(server: &MockServer, dir: &TempDir, max_depth: u32) -> Coordinator {
    let job = CrawlJob::new(&server.uri(), dir.path(), "test-job").unwrap();
    Coordinator::with_writer(test_config(max_depth), job, Box::new(std::io::sink())).unwrap()
}

#[tokio::test]
async fn test_scenario_crawl_respects_depth_bound() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<div class="video-item"><a href="/v/1">Title</a></div>
               <a href="/page2">Next</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v/1"))
        .respond_with(html_page("<p>player</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html_page(r#"<a href="/page3">Deeper</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Depth 2 must never be requested
    Mock::given(method("GET"))
        .and(path("/page3"))
        .respond_with(html_page("<p>too deep</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut coordinator = coordinator(&mock_server, &dir, 1);
    coordinator.crawl().await;

    let videos = coordinator.videos();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].url, format!("{}/v/1", base_url));
    assert_eq!(videos[0].title.as_deref(), Some("Title"));

    assert!(coordinator.visited().contains(&format!("{}/page2", base_url)));
    assert!(!coordinator.visited().contains(&format!("{}/page3", base_url)));
    assert_eq!(coordinator.state().pages_scraped, 3);
    assert_eq!(coordinator.state().errors, 0);

    assert!(dir.path().join(PROGRESS_FILE).exists());
    let saved = ResultStore::load(&dir.path().join(RESULTS_FILE)).unwrap();
    assert_eq!(saved, videos);
}

#[tokio::test]
async fn test_cross_domain_links_never_fetched() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&format!(
            r#"<a href="{}/elsewhere">Other site</a><a href="/local">Local</a>"#,
            other_server.uri()
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/local"))
        .respond_with(html_page("<p>local</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html_page("<p>should not be seen</p>"))
        .expect(0)
        .mount(&other_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut coordinator = coordinator(&mock_server, &dir, 2);
    coordinator.crawl().await;

    assert_eq!(coordinator.visited().len(), 2);
    let other = other_server.uri();
    assert!(coordinator.visited().iter().all(|u| !u.starts_with(&other)));
}

#[tokio::test]
async fn test_redirect_off_site_is_not_followed() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/out">Out</a>"#))
        .mount(&mock_server)
        .await;

    let landing = format!("{}/landing", other_server.uri());
    Mock::given(method("GET"))
        .and(path("/out"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", landing.as_str()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html_page(
            r#"<div class="video-item"><a href="/v/x">X</a></div><a href="/rel">Rel</a>"#,
        ))
        .expect(0)
        .mount(&other_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut coordinator = coordinator(&mock_server, &dir, 2);
    coordinator.crawl().await;

    let visited: HashSet<String> = coordinator.visited().clone();
    let expected: HashSet<String> = [format!("{}/", base_url), format!("{}/out", base_url)]
        .into_iter()
        .collect();
    assert_eq!(visited, expected);
    assert!(coordinator.videos().is_empty());

    let state = coordinator.state();
    assert_eq!(state.pages_scraped, 1);
    assert_eq!(state.errors, 1);
    assert!(state.last_error.as_deref().unwrap().contains("leaves the site"));
}

#[tokio::test]
async fn test_redirected_page_links_resolve_against_final_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/old">Old</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/shows/"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/shows/"))
        .respond_with(html_page(
            r#"<div class="video-item"><a href="ep1">Episode 1</a></div>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut coordinator = coordinator(&mock_server, &dir, 1);
    coordinator.crawl().await;

    let urls: Vec<&str> = coordinator.videos().iter().map(|v| v.url.as_str()).collect();
    assert_eq!(urls, vec![format!("{}/shows/ep1", base_url)]);
    assert!(coordinator.visited().contains(&format!("{}/old", base_url)));
    assert!(coordinator.visited().contains(&format!("{}/shows/", base_url)));
}

#[tokio::test]
async fn test_media_extension_links_never_fetched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<a href="/clip.mp4">clip</a>
               <a href="/poster.JPG">poster</a>
               <a href="/flyer.pdf">flyer</a>
               <a href="/song.mp3">song</a>
               <a href="/gallery">gallery</a>"#,
        ))
        .mount(&mock_server)
        .await;

    for media_path in ["/clip.mp4", "/poster.JPG", "/flyer.pdf", "/song.mp3"] {
        Mock::given(method("GET"))
            .and(path(media_path))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/gallery"))
        .respond_with(html_page("<p>gallery</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut coordinator = coordinator(&mock_server, &dir, 1);
    coordinator.crawl().await;

    assert_eq!(coordinator.visited().len(), 2);
}

#[tokio::test]
async fn test_failed_page_does_not_stop_siblings() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<a href="/broken">Broken</a><a href="/ok">Fine</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html_page(
            r#"<article class="video"><h2>Found it</h2><a href="/watch/9">Play</a></article>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut coordinator = coordinator(&mock_server, &dir, 1);
    coordinator.crawl().await;

    let state = coordinator.state();
    assert_eq!(state.errors, 1);
    assert!(state.last_error.as_deref().unwrap().contains("500"));
    assert_eq!(state.pages_scraped, 2);
    assert_eq!(coordinator.visited().len(), 3);
    assert!(coordinator.visited().len() as u64 >= state.pages_scraped);

    let videos = coordinator.videos();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].url, format!("{}/watch/9", base_url));
    assert_eq!(videos[0].title.as_deref(), Some("Found it"));
}

#[tokio::test]
async fn test_videos_unique_across_pages_and_fragments_collapse() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<div class="video-container"><a href="/v/1">One</a></div>
               <a href="/list#top">List</a>
               <a href="/list#bottom">List again</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/list"))
        .respond_with(html_page(
            r#"<div class="video-container"><a href="/v/1">One again</a></div>
               <div class="video-container"><a href="/v/2">Two</a></div>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v/1"))
        .respond_with(html_page("<p>player</p>"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v/2"))
        .respond_with(html_page("<p>player</p>"))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut coordinator = coordinator(&mock_server, &dir, 2);
    coordinator.crawl().await;

    let urls: Vec<&str> = coordinator.videos().iter().map(|v| v.url.as_str()).collect();
    let unique: HashSet<&str> = urls.iter().copied().collect();
    assert_eq!(urls.len(), 2);
    assert_eq!(unique.len(), urls.len());
    assert_eq!(coordinator.state().videos_found, 2);
}

#[tokio::test]
async fn test_unreachable_base_url_is_counted_not_fatal() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    drop(mock_server);

    let dir = TempDir::new().unwrap();
    let job = CrawlJob::new(&uri, dir.path(), "down").unwrap();
    let report = run_crawl(test_config(1), job, Arc::new(FakeExtractor::default()))
        .await
        .unwrap();

    assert_eq!(report.state.errors, 1);
    assert_eq!(report.state.pages_scraped, 0);
    assert_eq!(report.state.status, CrawlStatus::Completed);
    assert!(report.videos.is_empty());
}

#[tokio::test]
async fn test_courtesy_delay_between_fetches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/a">A</a><a href="/b">B</a>"#))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(html_page("<p>leaf</p>"))
        .mount(&mock_server)
        .await;

    let mut config = test_config(1);
    config.crawler.courtesy_delay_ms = 150;

    let dir = TempDir::new().unwrap();
    let job = CrawlJob::new(&mock_server.uri(), dir.path(), "polite").unwrap();
    let mut coordinator =
        Coordinator::with_writer(config, job, Box::new(std::io::sink())).unwrap();

    let started = Instant::now();
    coordinator.crawl().await;

    assert_eq!(coordinator.visited().len(), 3);
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_no_videos_found_is_final() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_page("<p>Nothing to watch</p>"))
        .mount(&mock_server)
        .await;

    let mut config = test_config(1);
    config.download.enabled = true;

    let dir = TempDir::new().unwrap();
    let job = CrawlJob::new(&mock_server.uri(), dir.path(), "empty").unwrap();
    let fake = Arc::new(FakeExtractor::default());
    let extractor: Arc<dyn MediaExtractor> = fake.clone();

    let report = run_crawl(config, job, extractor).await.unwrap();

    assert_eq!(report.state.status, CrawlStatus::NoVideosFound);
    assert_eq!(report.state.videos_downloaded, 0);
    assert!(report.downloads.is_none());
    assert_eq!(fake.calls(), 0);

    let snapshot: CrawlState =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join(PROGRESS_FILE)).unwrap())
            .unwrap();
    assert_eq!(snapshot.status, CrawlStatus::NoVideosFound);
    assert_eq!(snapshot.job_id, "empty");
}

#[tokio::test]
async fn test_download_phase_caps_and_completes() {
    let mock_server = MockServer::start().await;
    let items: String = (1..=5)
        .map(|i| format!(r#"<div class="video-item"><a href="/v/{}">Video {}</a></div>"#, i, i))
        .collect();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&items))
        .mount(&mock_server)
        .await;

    let mut config = test_config(0);
    config.download.enabled = true;
    config.download.max_videos = 2;

    let dir = TempDir::new().unwrap();
    let job = CrawlJob::new(&mock_server.uri(), dir.path(), "capped").unwrap();
    let fake = Arc::new(FakeExtractor::default());
    let report = run_crawl(config, job, fake.clone()).await.unwrap();

    assert_eq!(fake.calls(), 2);
    let targets = fake.targets.lock().unwrap().clone();
    let base_url = mock_server.uri();
    let expected: HashSet<String> = [1, 2].iter().map(|i| format!("{}/v/{}", base_url, i)).collect();
    assert_eq!(targets.into_iter().collect::<HashSet<_>>(), expected);

    assert_eq!(report.state.status, CrawlStatus::Completed);
    assert_eq!(report.state.total_to_download, Some(5));
    assert_eq!(report.state.videos_downloaded, 2);
    let downloads = report.downloads.unwrap();
    assert_eq!(downloads.attempted, 2);
    assert_eq!(downloads.succeeded, 2);
}

#[tokio::test]
async fn test_progress_stream_is_monotonic() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<div class="video-item"><a href="/v/1">One</a></div>
               <a href="/missing">Missing</a><a href="/more">More</a>"#,
        ))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/more"))
        .respond_with(html_page(r#"<div class="video-item"><a href="/v/2">Two</a></div>"#))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let buffer = SharedBuffer::default();
    let dir = TempDir::new().unwrap();
    let job = CrawlJob::new(&mock_server.uri(), dir.path(), "stream").unwrap();
    let mut coordinator =
        Coordinator::with_writer(test_config(1), job, Box::new(buffer.clone())).unwrap();
    coordinator.crawl().await;
    coordinator.finish();

    let lines = buffer.lines();
    assert_eq!(lines.first().unwrap()["status"], "starting");
    assert_eq!(lines.last().unwrap()["status"], "completed");

    for counter in ["pages_scraped", "videos_found", "errors"] {
        let values: Vec<u64> = lines.iter().map(|l| l[counter].as_u64().unwrap()).collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]), "{} decreased", counter);
    }

    let last = lines.last().unwrap();
    assert_eq!(last["job_id"], "stream");
    assert_eq!(last["videos_found"], 2);
    assert!(last["errors"].as_u64().unwrap() >= 1);
}
