//! Scoped filesystem primitives.
//!
//! Every temporary resource here follows the same shape: it is created next
//! to (or on behalf of) a destination, mutated freely, and then either
//! committed with an atomic rename or removed when dropped.
//!
//! - [`StagedFile`] - temp file beside a target, committed over it
//! - [`StagedPath`] - output path written by someone else (e.g. a subprocess)
//! - [`Workspace`] - uniquely named scratch directory
//! - [`prune`] - delete a file and the directories it leaves empty

mod error;
pub mod prune;
mod staged;
mod workspace;

pub use error::{Error, Result};
pub use prune::{Pruned, remove_file_and_empty_parents};
pub use staged::{StagedFile, StagedPath};
pub use workspace::{Workspace, WorkspaceEntry};

use std::path::Path;

/// Atomically moves `src` over `dest`. Both must live on the same filesystem.
pub fn replace_file(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<()> {
    let (src, dest) = (src.as_ref(), dest.as_ref());
    std::fs::rename(src, dest).map_err(|source| Error::Rename {
        from: src.to_path_buf(),
        to: dest.to_path_buf(),
        source,
    })
}

/// Directory containing `path`, treating a bare file name as the current dir.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
