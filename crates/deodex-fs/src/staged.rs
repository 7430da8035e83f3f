use std::ffi::OsString;
use std::fs::{self, File, Permissions};
use std::io::{self, Seek};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{Error, Result, parent_dir, replace_file};

/// A temporary file created beside the file it will eventually replace.
///
/// Living in the same directory keeps the final [`commit`](Self::commit) a
/// plain rename on one filesystem. Dropping an uncommitted `StagedFile`
/// removes it, so every early return or `?` leaves the target untouched.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    /// Create an empty file named `<target-file-name>.XXXXXX` next to `target`.
    pub fn beside(target: impl AsRef<Path>) -> Result<Self> {
        let target = target.as_ref();
        let name = target
            .file_name()
            .ok_or_else(|| Error::NoFileName(target.to_path_buf()))?;
        let mut prefix = OsString::from(name);
        prefix.push(".");

        let dir = parent_dir(target);
        let file = tempfile::Builder::new()
            .prefix(&prefix)
            .tempfile_in(dir)
            .map_err(|source| Error::Write {
                path: dir.to_path_buf(),
                source,
            })?;

        Ok(Self { file })
    }

    /// Create a staged copy of `target`'s current bytes, rewound to the start.
    pub fn copy_of(target: impl AsRef<Path>) -> Result<Self> {
        let target = target.as_ref();
        let mut staged = Self::beside(target)?;

        let mut original = File::open(target).map_err(|source| Error::Read {
            path: target.to_path_buf(),
            source,
        })?;
        let path = staged.path().to_path_buf();
        io::copy(&mut original, staged.as_file_mut())
            .and_then(|_| staged.as_file_mut().rewind())
            .map_err(|source| Error::Write { path, source })?;

        Ok(staged)
    }

    pub fn path(&self) -> &Path { self.file.path() }

    pub fn as_file_mut(&mut self) -> &mut File { self.file.as_file_mut() }

    pub fn set_permissions(&self, permissions: Permissions) -> Result<()> {
        fs::set_permissions(self.path(), permissions).map_err(|source| Error::Write {
            path: self.path().to_path_buf(),
            source,
        })
    }

    /// Flush to disk and atomically rename over `dest`.
    ///
    /// On failure the staged file is still removed.
    pub fn commit(self, dest: impl AsRef<Path>) -> Result<()> {
        let dest = dest.as_ref();
        self.file
            .as_file()
            .sync_all()
            .map_err(|source| Error::Write {
                path: self.path().to_path_buf(),
                source,
            })?;
        self.file.persist(dest).map_err(|e| Error::Rename {
            from: e.file.path().to_path_buf(),
            to: dest.to_path_buf(),
            source: e.error,
        })?;
        Ok(())
    }
}

/// An output path produced by an external writer, removed on drop unless
/// committed.
#[derive(Debug)]
pub struct StagedPath {
    path:  PathBuf,
    armed: bool,
}

impl StagedPath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path:  path.into(),
            armed: true,
        }
    }

    /// `<target><suffix>`, e.g. `app.apk` + `.zipaligned`.
    pub fn with_suffix(target: impl AsRef<Path>, suffix: &str) -> Self {
        let mut path = target.as_ref().as_os_str().to_owned();
        path.push(suffix);
        Self::new(path)
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Remove a leftover file at this path. Returns whether one existed.
    pub fn discard_stale(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "removed stale output");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(Error::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }

    pub fn commit(mut self, dest: impl AsRef<Path>) -> Result<()> {
        replace_file(&self.path, dest)?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for StagedPath {
    fn drop(&mut self) {
        if self.armed {
            let _ = fs::remove_file(&self.path);
        }
    }
}
