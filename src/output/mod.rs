//! Output module for progress reporting and result snapshots
//!
//! This module handles:
//! - Emitting one JSON progress line per state update to the output stream
//! - Overwriting `progress.json` with the full run state on every update
//! - Overwriting `videos.json` with the discovered candidates after each page
//!
//! Snapshot writes are best-effort: a failed write is logged and the run
//! carries on.

mod progress;
mod results;

pub use progress::{ProgressReporter, PROGRESS_FILE};
pub use results::{ResultStore, RESULTS_FILE};

use std::io::Write;
use std::path::Path;

/// Writes `contents` to `path` through a temporary sibling file and a rename
///
/// A reader tailing the snapshot never observes a half-written file.
pub(crate) fn write_snapshot(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp_path = path.with_extension("json.tmp");

    {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.flush()?;
    }

    std::fs::rename(&tmp_path, path)
}
