//! Progress reporting to a supervising process
//!
//! The reporter is the only place the run state changes. Every call to
//! [`ProgressReporter::report`] merges a partial update, writes the full
//! state as one compact JSON line to the output stream, and overwrites
//! `progress.json` with the same structure. A supervisor can reconstruct run
//! health from the latest line or from the file alone.

use crate::output::write_snapshot;
use crate::state::{CrawlState, ProgressUpdate};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the run-state snapshot inside the output directory
pub const PROGRESS_FILE: &str = "progress.json";

/// Single-writer owner of the run state
pub struct ProgressReporter {
    state: CrawlState,
    writer: Box<dyn Write + Send>,
    snapshot_path: PathBuf,
}

impl ProgressReporter {
    /// Creates a reporter writing progress lines to `writer`
    ///
    /// # Arguments
    ///
    /// * `output_dir` - Directory receiving `progress.json` (must exist)
    /// * `job_id` - Identifier echoed in every record
    /// * `writer` - The primary output stream
    pub fn new(
        output_dir: &Path,
        job_id: impl Into<String>,
        writer: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            state: CrawlState::new(job_id),
            writer,
            snapshot_path: output_dir.join(PROGRESS_FILE),
        }
    }

    /// Merges `update` into the run state and externalizes the result
    ///
    /// Emission and snapshot failures are logged, never returned.
    pub fn report(&mut self, update: ProgressUpdate) -> &CrawlState {
        self.state.apply(update);
        self.emit_line();
        self.write_file();
        &self.state
    }

    /// Returns the current run state
    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Returns the path of the progress snapshot
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    fn emit_line(&mut self) {
        let line = match serde_json::to_string(&self.state) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to serialize progress: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(self.writer, "{}", line).and_then(|_| self.writer.flush()) {
            tracing::warn!("Failed to emit progress line: {}", e);
        }
    }

    fn write_file(&self) {
        let result = serde_json::to_vec_pretty(&self.state)
            .map_err(std::io::Error::from)
            .and_then(|json| write_snapshot(&self.snapshot_path, &json));

        if let Err(e) = result {
            tracing::warn!(
                "Failed to write progress snapshot {}: {}",
                self.snapshot_path.display(),
                e
            );
        }
    }
}
