//! Bounded-parallel download of discovered candidates
//!
//! Downloads are submitted in discovery order and complete in any order. At
//! most `concurrency` are in flight. Completions are consumed one at a time
//! by the loop that owns the [`ProgressReporter`], so counter updates never
//! race.

use crate::crawler::VideoCandidate;
use crate::media::{MediaDownload, MediaExtractor, MediaRequest};
use crate::output::ProgressReporter;
use crate::state::ProgressUpdate;
use crate::DownloadError;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Result of one candidate's download
#[derive(Debug)]
pub struct DownloadOutcome {
    pub url: String,
    pub result: Result<MediaDownload, DownloadError>,
}

#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// In completion order
    pub outcomes: Vec<DownloadOutcome>,
}

pub struct DownloadCoordinator {
    extractor: Arc<dyn MediaExtractor>,
    concurrency: usize,
    template: MediaRequest,
}

impl DownloadCoordinator {
    /// Creates a coordinator
    ///
    /// # Arguments
    ///
    /// * `extractor` - Backend performing each fetch
    /// * `concurrency` - Maximum downloads in flight (at least 1)
    /// * `template` - Quality, format and output location shared by every
    ///   request; its target is replaced by each candidate URL
    pub fn new(
        extractor: Arc<dyn MediaExtractor>,
        concurrency: usize,
        template: MediaRequest,
    ) -> Self {
        Self {
            extractor,
            concurrency: concurrency.max(1),
            template,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Downloads every candidate and reports each completion
    ///
    /// A failed item bumps `errors` and sets `last_error`; it never stops
    /// the others.
    pub async fn run(
        &self,
        candidates: &[VideoCandidate],
        reporter: &mut ProgressReporter,
    ) -> DownloadSummary {
        tracing::info!(
            "Downloading {} videos, {} at a time",
            candidates.len(),
            self.concurrency
        );

        let mut summary = DownloadSummary {
            attempted: candidates.len(),
            ..DownloadSummary::default()
        };

        let mut downloads = stream::iter(candidates.iter().map(|c| c.url.clone()))
            .map(|url| {
                let extractor = Arc::clone(&self.extractor);
                let request = self.template.for_target(url.clone());
                async move {
                    let result = extractor.download(&request).await;
                    DownloadOutcome { url, result }
                }
            })
            .buffer_unordered(self.concurrency);

        while let Some(outcome) = downloads.next().await {
            match &outcome.result {
                Ok(download) => {
                    summary.succeeded += 1;
                    tracing::info!("Downloaded {} to {}", outcome.url, download.file_path.display());
                    let downloaded = reporter.state().videos_downloaded + 1;
                    reporter.report(ProgressUpdate::new().videos_downloaded(downloaded));
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!("Download failed for {}: {}", outcome.url, e);
                    let errors = reporter.state().errors + 1;
                    reporter.report(
                        ProgressUpdate::new()
                            .errors(errors)
                            .last_error(format!("{}: {}", outcome.url, e)),
                    );
                }
            }
            summary.outcomes.push(outcome);
        }

        summary
    }
}
