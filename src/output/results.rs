//! Result snapshots of discovered video candidates

use crate::crawler::VideoCandidate;
use crate::output::write_snapshot;
use crate::TrawlError;
use std::path::{Path, PathBuf};

/// File name of the results snapshot inside the output directory
pub const RESULTS_FILE: &str = "videos.json";

/// Periodically overwritten snapshot of the run's candidates
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            path: output_dir.join(RESULTS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the snapshot with `videos`, in order
    ///
    /// Returns false if the snapshot could not be written. The failure is
    /// logged and the previous snapshot, if any, is left in place.
    pub fn save(&self, videos: &[VideoCandidate]) -> bool {
        let result = serde_json::to_vec_pretty(videos)
            .map_err(std::io::Error::from)
            .and_then(|json| write_snapshot(&self.path, &json));

        match result {
            Ok(()) => {
                tracing::debug!("Saved {} videos to {}", videos.len(), self.path.display());
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to write results snapshot {}: {}",
                    self.path.display(),
                    e
                );
                false
            }
        }
    }

    /// Reads a snapshot previously written by [`ResultStore::save`]
    pub fn load(path: &Path) -> Result<Vec<VideoCandidate>, TrawlError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
