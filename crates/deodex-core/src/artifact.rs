//! Locating the optimized files that belong to a container.
//!
//! Two layouts are recognized, relative to the container's directory:
//!
//! - `oat/<arch>/<stem>.{odex,vdex}` for any APK or JAR
//! - `<arch>/boot-<stem>.{art,oat,vdex}` for JARs on the boot classpath
//!
//! Stems are compared byte for byte, so names containing `[`, `*` or `?`
//! never act as patterns. Symlinks are not followed: a linked `oat` dir, arch
//! dir or artifact is ignored, so nothing reported can lie outside the tree.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fs::{self, FileType};
use std::path::{Path, PathBuf};

use deodex_fs::parent_dir;

/// Kind of optimized file, keyed by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArtifactKind {
    /// `.art`: compiled boot image.
    Art,
    /// `.oat`: compiled native code.
    Oat,
    /// `.odex`: optimized dex.
    Odex,
    /// `.vdex`: verified dex container, the only source of bytecode.
    Vdex,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [Self::Art, Self::Oat, Self::Odex, Self::Vdex];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Art => "art",
            Self::Oat => "oat",
            Self::Odex => "odex",
            Self::Vdex => "vdex",
        }
    }

    pub fn from_extension(ext: &OsStr) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| ext == kind.extension())
    }
}

/// Optimized files found for one container, grouped by kind in discovery
/// order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    by_kind: BTreeMap<ArtifactKind, Vec<PathBuf>>,
}

impl ArtifactSet {
    pub fn insert(&mut self, kind: ArtifactKind, path: PathBuf) {
        self.by_kind.entry(kind).or_default().push(path);
    }

    pub fn get(&self, kind: ArtifactKind) -> &[PathBuf] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Extraction candidates, in the order they should be tried.
    pub fn vdex(&self) -> &[PathBuf] { self.get(ArtifactKind::Vdex) }

    pub fn is_empty(&self) -> bool { self.by_kind.is_empty() }

    pub fn len(&self) -> usize { self.by_kind.values().map(Vec::len).sum() }

    /// Every path, grouped by kind.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.by_kind.values().flatten().map(PathBuf::as_path)
    }
}

/// Find the optimized files for `container`.
///
/// Unreadable or missing directories contribute nothing; the locator never
/// fails and never touches the files it reports.
pub fn locate(container: &Path) -> ArtifactSet {
    let mut set = ArtifactSet::default();
    let Some(stem) = container.file_stem() else {
        return set;
    };
    let base = parent_dir(container);

    let oat = base.join("oat");
    if is_real_dir(&oat) {
        for arch in subdirs(&oat) {
            collect(&arch, stem, &mut set);
        }
    }

    if container.extension() == Some(OsStr::new("jar")) {
        let mut boot_stem = OsString::from("boot-");
        boot_stem.push(stem);
        for arch in subdirs(base) {
            collect(&arch, &boot_stem, &mut set);
        }
    }

    set
}

/// Entries of `dir` with their own (unfollowed) file type, sorted by path.
fn sorted_entries(dir: &Path) -> Vec<(PathBuf, FileType)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(dir = %dir.display(), %err, "skipping unreadable directory");
            }
            return Vec::new();
        }
    };
    let mut paths: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| Some((e.path(), e.file_type().ok()?)))
        .collect();
    paths.sort_by(|a, b| a.0.cmp(&b.0));
    paths
}

fn is_real_dir(path: &Path) -> bool { fs::symlink_metadata(path).is_ok_and(|m| m.is_dir()) }

fn subdirs(dir: &Path) -> Vec<PathBuf> {
    sorted_entries(dir)
        .into_iter()
        .filter(|(path, file_type)| file_type.is_dir() && !is_hidden(path))
        .map(|(path, _)| path)
        .collect()
}

fn collect(dir: &Path, stem: &OsStr, set: &mut ArtifactSet) {
    for (path, file_type) in sorted_entries(dir) {
        let Some(name) = path.file_name() else { continue };
        if !file_type.is_file() || !has_stem(name, stem) {
            continue;
        }
        if let Some(kind) = path.extension().and_then(ArtifactKind::from_extension) {
            set.insert(kind, path);
        }
    }
}

/// `name` is `<stem>.<anything>`.
fn has_stem(name: &OsStr, stem: &OsStr) -> bool {
    name.as_encoded_bytes()
        .strip_prefix(stem.as_encoded_bytes())
        .is_some_and(|rest| rest.starts_with(b"."))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.as_encoded_bytes().starts_with(b"."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn apk_oat_layout() {
        let root = tempdir().unwrap();
        let apk = root.path().join("app/Foo/Foo.apk");
        touch(&apk);
        touch(&root.path().join("app/Foo/oat/arm64/Foo.odex"));
        touch(&root.path().join("app/Foo/oat/arm64/Foo.vdex"));
        touch(&root.path().join("app/Foo/oat/arm/Foo.vdex"));
        touch(&root.path().join("app/Foo/oat/arm64/Foo.prof"));
        touch(&root.path().join("app/Foo/oat/arm64/FooBar.vdex"));

        let set = locate(&apk);

        assert_eq!(set.len(), 3);
        assert_eq!(set.get(ArtifactKind::Odex), [root.path().join("app/Foo/oat/arm64/Foo.odex")]);
        assert_eq!(
            set.vdex(),
            [
                root.path().join("app/Foo/oat/arm/Foo.vdex"),
                root.path().join("app/Foo/oat/arm64/Foo.vdex"),
            ]
        );
    }

    #[test]
    fn apk_ignores_boot_layout() {
        let root = tempdir().unwrap();
        let apk = root.path().join("Foo.apk");
        touch(&apk);
        touch(&root.path().join("arm64/boot-Foo.vdex"));

        assert!(locate(&apk).is_empty());
    }

    #[test]
    fn jar_boot_layout() {
        let root = tempdir().unwrap();
        let framework = root.path().join("framework");
        let jar = framework.join("core-libart.jar");
        touch(&jar);
        touch(&framework.join("arm64/boot-core-libart.art"));
        touch(&framework.join("arm64/boot-core-libart.oat"));
        touch(&framework.join("arm64/boot-core-libart.vdex"));
        touch(&framework.join("oat/arm64/core-libart.odex"));
        touch(&framework.join("arm64/boot.art"));

        let set = locate(&jar);

        assert_eq!(set.len(), 4);
        assert_eq!(set.get(ArtifactKind::Art).len(), 1);
        assert_eq!(set.get(ArtifactKind::Oat).len(), 1);
        assert_eq!(set.get(ArtifactKind::Odex).len(), 1);
        assert_eq!(set.vdex(), [framework.join("arm64/boot-core-libart.vdex")]);
    }

    #[test]
    fn stem_is_not_a_pattern() {
        let root = tempdir().unwrap();
        let apk = root.path().join("Fo[o].apk");
        touch(&apk);
        touch(&root.path().join("oat/arm64/Fo[o].vdex"));
        touch(&root.path().join("oat/arm64/Foo.vdex"));
        touch(&root.path().join("oat/arm64/Fo*.vdex"));

        let set = locate(&apk);

        assert_eq!(set.vdex(), [root.path().join("oat/arm64/Fo[o].vdex")]);
    }

    #[test]
    fn hidden_arch_dirs_and_directories_skipped() {
        let root = tempdir().unwrap();
        let apk = root.path().join("Foo.apk");
        touch(&apk);
        touch(&root.path().join("oat/.cache/Foo.vdex"));
        fs::create_dir_all(root.path().join("oat/arm64/Foo.odex")).unwrap();

        assert!(locate(&apk).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_followed() {
        use std::os::unix::fs::symlink;

        let root = tempdir().unwrap();
        let outside = tempdir().unwrap();
        touch(&outside.path().join("arm64/Foo.vdex"));
        touch(&outside.path().join("Foo.odex"));

        let apk = root.path().join("app/Foo.apk");
        touch(&apk);
        fs::create_dir_all(root.path().join("app/oat")).unwrap();
        symlink(outside.path().join("arm64"), root.path().join("app/oat/arm64")).unwrap();
        fs::create_dir_all(root.path().join("app/oat/arm")).unwrap();
        symlink(outside.path().join("Foo.odex"), root.path().join("app/oat/arm/Foo.odex")).unwrap();
        assert!(locate(&apk).is_empty());

        let other = root.path().join("priv-app/Foo.apk");
        touch(&other);
        symlink(outside.path(), root.path().join("priv-app/oat")).unwrap();
        assert!(locate(&other).is_empty());
    }

    #[test]
    fn nothing_found() {
        let root = tempdir().unwrap();
        let apk = root.path().join("Foo.apk");
        touch(&apk);
        let set = locate(&apk);
        assert!(set.is_empty());
        assert_eq!(set.paths().count(), 0);
    }

    #[test]
    fn kind_from_extension() {
        assert_eq!(ArtifactKind::from_extension(OsStr::new("vdex")), Some(ArtifactKind::Vdex));
        assert_eq!(ArtifactKind::from_extension(OsStr::new("art")), Some(ArtifactKind::Art));
        assert_eq!(ArtifactKind::from_extension(OsStr::new("prof")), None);
        assert_eq!(ArtifactKind::from_extension(OsStr::new("VDEX")), None);
    }
}
