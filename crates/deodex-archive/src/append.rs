use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read, Seek, Write};
use std::path::PathBuf;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};
use crate::sanitize::validate_entry_name;

/// A file on disk to be added to an archive under `name`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEntry {
    pub name:   String,
    pub source: PathBuf,
}

impl NewEntry {
    pub fn new(name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            name:   name.into(),
            source: source.into(),
        }
    }
}

/// Append `entries` to the zip held in `archive`, keeping every existing
/// member byte for byte.
///
/// Entries are stored uncompressed, in the order given. Names are validated
/// and checked against the existing central directory before anything is
/// written. The archive handle is returned positioned after the new central
/// directory.
pub fn append_entries<A>(mut archive: A, entries: &[NewEntry]) -> Result<A>
where
    A: Read + Write + Seek,
{
    let mut seen: HashSet<String> = ZipArchive::new(&mut archive)
        .map_err(Error::Unreadable)?
        .file_names()
        .map(str::to_owned)
        .collect();
    for entry in entries {
        validate_entry_name(&entry.name)?;
        if !seen.insert(entry.name.clone()) {
            return Err(Error::DuplicateEntry {
                name: entry.name.clone(),
            });
        }
    }
    archive.rewind()?;

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut zip = ZipWriter::new_append(archive)?;
    for entry in entries {
        let mut source = File::open(&entry.source).map_err(|source| Error::EntrySource {
            path: entry.source.clone(),
            source,
        })?;
        zip.start_file(entry.name.as_str(), options)?;
        let written = io::copy(&mut source, &mut zip).map_err(|source| Error::EntrySource {
            path: entry.source.clone(),
            source,
        })?;
        tracing::debug!(entry = %entry.name, bytes = written, "appended archive entry");
    }

    Ok(zip.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn read_entry(bytes: &[u8], name: &str) -> Vec<u8> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut out = Vec::new();
        archive.by_name(name).unwrap().read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn appends_after_existing_members() {
        let dir = tempfile::tempdir().unwrap();
        let dex = dir.path().join("app.apk_classes.dex");
        std::fs::write(&dex, b"dex\n035\0").unwrap();

        let archive = Cursor::new(zip_bytes(&[("AndroidManifest.xml", b"<manifest/>")]));
        let archive = append_entries(archive, &[NewEntry::new("classes.dex", &dex)]).unwrap();
        let bytes = archive.into_inner();

        let names: Vec<_> = ZipArchive::new(Cursor::new(&bytes[..]))
            .unwrap()
            .file_names()
            .map(str::to_owned)
            .collect();
        assert_eq!(names, vec!["AndroidManifest.xml", "classes.dex"]);
        assert_eq!(read_entry(&bytes, "AndroidManifest.xml"), b"<manifest/>");
        assert_eq!(read_entry(&bytes, "classes.dex"), b"dex\n035\0");
    }

    #[test]
    fn rejects_duplicate_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let dex = dir.path().join("dex");
        std::fs::write(&dex, b"dex").unwrap();

        let original = zip_bytes(&[("classes2.dex", b"old")]);
        let err = append_entries(
            Cursor::new(original.clone()),
            &[NewEntry::new("classes.dex", &dex), NewEntry::new("classes2.dex", &dex)],
        )
        .unwrap_err();

        assert!(matches!(err, Error::DuplicateEntry { ref name } if name == "classes2.dex"));
    }

    #[test]
    fn rejects_non_archive() {
        let err = append_entries(Cursor::new(b"not a zip".to_vec()), &[]).unwrap_err();
        assert!(matches!(err, Error::Unreadable(_)));
        assert!(err.to_string().starts_with("cannot read archive"));
    }

    #[test]
    fn missing_entry_source() {
        let archive = Cursor::new(zip_bytes(&[("a", b"a")]));
        let err = append_entries(archive, &[NewEntry::new("classes.dex", "/nonexistent/dex")])
            .unwrap_err();
        assert!(matches!(err, Error::EntrySource { .. }));
    }
}
