//! Deleting files together with the directory chain they leave empty.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// What [`remove_file_and_empty_parents`] actually removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pruned {
    /// `false` when the file was already gone.
    pub file_removed: bool,
    /// Removed directories, innermost first.
    pub dirs_removed: Vec<PathBuf>,
}

/// Remove `path`, then each ancestor directory that is now empty.
///
/// The upward walk stops at the first directory that is not empty or no
/// longer exists, and never removes `root` or anything above it. Paths
/// outside `root`, lexically or once symlinks in their parent are resolved,
/// are rejected before anything is touched.
pub fn remove_file_and_empty_parents(path: impl AsRef<Path>, root: impl AsRef<Path>) -> Result<Pruned> {
    let (path, root) = (path.as_ref(), root.as_ref());
    if path == root || !path.starts_with(root) {
        return Err(Error::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        });
    }

    let mut pruned = Pruned::default();
    let Some(real_parent) = resolve_parent(path)? else {
        return Ok(pruned);
    };
    let real_root = fs::canonicalize(root).map_err(|source| Error::Read {
        path: root.to_path_buf(),
        source,
    })?;
    if !real_parent.starts_with(&real_root) {
        return Err(Error::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        });
    }

    match fs::remove_file(path) {
        Ok(()) => pruned.file_removed = true,
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(source) => {
            return Err(Error::Remove {
                path: path.to_path_buf(),
                source,
            });
        }
    }

    for dir in path.ancestors().skip(1) {
        if dir == root || !dir.starts_with(root) {
            break;
        }
        match fs::remove_dir(dir) {
            Ok(()) => {
                tracing::debug!(dir = %dir.display(), "removed empty directory");
                pruned.dirs_removed.push(dir.to_path_buf());
            }
            Err(e) if matches!(e.kind(), ErrorKind::DirectoryNotEmpty | ErrorKind::NotFound) => break,
            Err(source) => {
                return Err(Error::Remove {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        }
    }

    Ok(pruned)
}

/// The canonical parent directory of `path`, or `None` when it is gone.
fn resolve_parent(path: &Path) -> Result<Option<PathBuf>> {
    let parent = crate::parent_dir(path);
    match fs::canonicalize(parent) {
        Ok(real) => Ok(Some(real)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::Read {
            path: parent.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn removes_file_and_empty_chain() {
        let root = tempdir().unwrap();
        let arch = root.path().join("app/oat/arm64");
        fs::create_dir_all(&arch).unwrap();
        fs::write(root.path().join("app/app.apk"), "zip").unwrap();
        let odex = arch.join("app.odex");
        fs::write(&odex, "odex").unwrap();

        let pruned = remove_file_and_empty_parents(&odex, root.path()).unwrap();

        assert!(pruned.file_removed);
        assert_eq!(pruned.dirs_removed, vec![arch.clone(), root.path().join("app/oat")]);
        assert!(root.path().join("app/app.apk").exists());
    }

    #[test]
    fn stops_at_non_empty_directory() {
        let root = tempdir().unwrap();
        let arch = root.path().join("oat/arm64");
        fs::create_dir_all(&arch).unwrap();
        fs::write(arch.join("app.odex"), "odex").unwrap();
        fs::write(arch.join("app.vdex"), "vdex").unwrap();

        let pruned = remove_file_and_empty_parents(arch.join("app.odex"), root.path()).unwrap();

        assert!(pruned.dirs_removed.is_empty());
        assert!(arch.join("app.vdex").exists());
    }

    #[test]
    fn never_removes_root() {
        let root = tempdir().unwrap();
        let file = root.path().join("boot.oat");
        fs::write(&file, "oat").unwrap();

        let pruned = remove_file_and_empty_parents(&file, root.path()).unwrap();

        assert!(pruned.file_removed);
        assert!(pruned.dirs_removed.is_empty());
        assert!(root.path().is_dir());
    }

    #[test]
    fn missing_file_still_prunes() {
        let root = tempdir().unwrap();
        let arch = root.path().join("oat/arm");
        fs::create_dir_all(&arch).unwrap();

        let pruned = remove_file_and_empty_parents(arch.join("gone.vdex"), root.path()).unwrap();

        assert!(!pruned.file_removed);
        assert_eq!(pruned.dirs_removed.len(), 2);
    }

    #[test]
    fn rejects_paths_outside_root() {
        let root = tempdir().unwrap();
        let other = tempdir().unwrap();
        let file = other.path().join("boot.art");
        fs::write(&file, "art").unwrap();

        let err = remove_file_and_empty_parents(&file, root.path()).unwrap_err();

        assert!(matches!(err, Error::OutsideRoot { .. }));
        assert!(file.exists());
    }

    #[cfg(unix)]
    #[test]
    fn rejects_files_behind_symlinked_dirs() {
        let root = tempdir().unwrap();
        let outside = tempdir().unwrap();
        let vdex = outside.path().join("Foo.vdex");
        fs::write(&vdex, "vdex").unwrap();
        fs::create_dir(root.path().join("oat")).unwrap();
        std::os::unix::fs::symlink(outside.path(), root.path().join("oat/arm64")).unwrap();

        let err = remove_file_and_empty_parents(root.path().join("oat/arm64/Foo.vdex"), root.path())
            .unwrap_err();

        assert!(matches!(err, Error::OutsideRoot { .. }));
        assert!(vdex.exists());
        assert!(root.path().join("oat/arm64").exists());
    }

    #[test]
    fn missing_parent_is_a_noop() {
        let root = tempdir().unwrap();
        let pruned = remove_file_and_empty_parents(root.path().join("oat/arm/gone.odex"), root.path())
            .unwrap();
        assert_eq!(pruned, Pruned::default());
    }
}
