//! Artifact cleanup.

use std::path::Path;

use deodex_fs::remove_file_and_empty_parents;
use tracing::debug;

use crate::error::{Error, Result};

/// Files and directories removed by [`remove_artifacts`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanupStats {
    pub files: usize,
    pub dirs:  usize,
}

/// Delete each path and prune the directories it leaves empty, never going
/// above `root`. Paths that are already gone are skipped.
pub fn remove_artifacts<'a>(root: &Path, paths: impl IntoIterator<Item = &'a Path>) -> Result<CleanupStats> {
    let mut stats = CleanupStats::default();
    for path in paths {
        let pruned = remove_file_and_empty_parents(path, root).map_err(Error::Cleanup)?;
        if pruned.file_removed {
            debug!(path = %path.display(), "removed");
            stats.files += 1;
        }
        stats.dirs += pruned.dirs_removed.len();
    }
    Ok(stats)
}
