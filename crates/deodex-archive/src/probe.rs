use std::fs::File;
use std::path::Path;

use zip::ZipArchive;

use crate::error::{Error, Result};

/// Entry whose presence marks a container as already holding its bytecode.
pub const CLASSES_DEX: &str = "classes.dex";

fn open(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    ZipArchive::new(file).map_err(|source| Error::NotAnArchive {
        path: path.to_path_buf(),
        source,
    })
}

/// Names of every entry, in central directory order.
pub fn entry_names(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let archive = open(path.as_ref())?;
    Ok(archive.file_names().map(str::to_owned).collect())
}

pub fn has_entry(path: impl AsRef<Path>, name: &str) -> Result<bool> {
    let archive = open(path.as_ref())?;
    Ok(archive.file_names().any(|n| n == name))
}

/// Whether the container already carries `classes.dex`. The bytecode itself
/// is not inspected.
pub fn is_deodexed(path: impl AsRef<Path>) -> Result<bool> { has_entry(path, CLASSES_DEX) }
