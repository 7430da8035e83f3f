//! Alignment normalizer.

use std::fs;
use std::path::Path;

use deodex_fs::StagedPath;
use tracing::debug;

use crate::effects::Aligner;
use crate::error::{Error, Result};

/// Suffix of the aligner's output file, next to the container.
pub const ALIGNED_SUFFIX: &str = ".zipaligned";

/// Zipalign `container` in place if it is not already aligned.
///
/// An aligned container is left alone, mtime included. Otherwise the aligned
/// copy is written to `<container>.zipaligned`, given the container's
/// permissions and renamed over the original.
/// Returns whether the container was rewritten. Every failure here is fatal.
pub fn normalize<A: Aligner>(aligner: &A, container: &Path) -> Result<bool> {
    let aligned = aligner
        .is_aligned(container)
        .map_err(|source| Error::AlignCheck {
            path: container.to_path_buf(),
            source,
        })?;
    if aligned {
        debug!(container = %container.display(), "already aligned");
        return Ok(false);
    }

    let rewrite_error = |source: Box<dyn std::error::Error + Send + Sync>| Error::AlignRewrite {
        path: container.to_path_buf(),
        source,
    };

    let permissions = fs::metadata(container)
        .map_err(|e| rewrite_error(e.into()))?
        .permissions();
    let output = StagedPath::with_suffix(container, ALIGNED_SUFFIX);
    output.discard_stale().map_err(|e| rewrite_error(e.into()))?;
    aligner
        .align(container, output.path())
        .map_err(|e| rewrite_error(e.into()))?;
    fs::set_permissions(output.path(), permissions).map_err(|e| rewrite_error(e.into()))?;
    output.commit(container).map_err(|e| rewrite_error(e.into()))?;

    debug!(container = %container.display(), "realigned");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::tempdir;

    struct Fake {
        aligned: bool,
        fail:    bool,
        aligns:  Cell<usize>,
    }

    impl Fake {
        fn new(aligned: bool, fail: bool) -> Self {
            Self {
                aligned,
                fail,
                aligns: Cell::new(0),
            }
        }
    }

    impl Aligner for Fake {
        fn is_aligned(&self, _archive: &Path) -> deodex_platform::Result<bool> { Ok(self.aligned) }

        fn align(&self, input: &Path, output: &Path) -> deodex_platform::Result<()> {
            self.aligns.set(self.aligns.get() + 1);
            let mut data = fs::read(input).unwrap();
            data.extend_from_slice(b"+aligned");
            fs::write(output, data).unwrap();
            if self.fail {
                return Err(deodex_platform::Error::CommandFailed {
                    cmd:    "zipalign".into(),
                    source: std::io::Error::other("boom"),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn aligned_is_noop() {
        let dir = tempdir().unwrap();
        let apk = dir.path().join("Foo.apk");
        fs::write(&apk, "zip").unwrap();
        let aligner = Fake::new(true, false);

        assert!(!normalize(&aligner, &apk).unwrap());
        assert_eq!(aligner.aligns.get(), 0);
        assert_eq!(fs::read(&apk).unwrap(), b"zip");
    }

    #[test]
    fn misaligned_is_rewritten() {
        let dir = tempdir().unwrap();
        let apk = dir.path().join("Foo.apk");
        fs::write(&apk, "zip").unwrap();
        fs::write(dir.path().join("Foo.apk.zipaligned"), "stale").unwrap();

        assert!(normalize(&Fake::new(false, false), &apk).unwrap());
        assert_eq!(fs::read(&apk).unwrap(), b"zip+aligned");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn rewrite_failure_is_fatal_and_cleans_output() {
        let dir = tempdir().unwrap();
        let apk = dir.path().join("Foo.apk");
        fs::write(&apk, "zip").unwrap();

        let err = normalize(&Fake::new(false, true), &apk).unwrap_err();

        assert!(matches!(err, Error::AlignRewrite { .. }));
        assert_eq!(fs::read(&apk).unwrap(), b"zip");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
