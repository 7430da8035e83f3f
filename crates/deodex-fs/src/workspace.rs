use std::ffi::OsString;
use std::fs::FileType;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{Error, Result};

/// A uniquely named scratch directory, removed with its contents on drop.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

/// A single top-level entry of a [`Workspace`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceEntry {
    pub name:      OsString,
    pub path:      PathBuf,
    /// Type of the entry itself; symlinks are not followed.
    pub file_type: FileType,
}

impl WorkspaceEntry {
    pub fn is_file(&self) -> bool { self.file_type.is_file() }
}

impl Workspace {
    /// Create `<root>/<prefix>XXXXXX`.
    pub fn new_in(root: impl AsRef<Path>, prefix: &str) -> Result<Self> {
        let root = root.as_ref();
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(root)
            .map_err(|source| Error::Write {
                path: root.to_path_buf(),
                source,
            })?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path { self.dir.path() }

    /// Top-level entries sorted by name.
    pub fn entries(&self) -> Result<Vec<WorkspaceEntry>> {
        let read_err = |source: std::io::Error| Error::Read {
            path: self.path().to_path_buf(),
            source,
        };

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(self.path()).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;
            entries.push(WorkspaceEntry {
                name:      entry.file_name(),
                path:      entry.path(),
                file_type: entry.file_type().map_err(read_err)?,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    pub fn is_empty(&self) -> Result<bool> { Ok(self.entries()?.is_empty()) }

    /// Remove the workspace now, reporting failures instead of ignoring them.
    pub fn close(self) -> Result<()> {
        let path = self.path().to_path_buf();
        self.dir
            .close()
            .map_err(|source| Error::Remove { path, source })
    }
}
