use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open '{path}': {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("'{path}' is not a valid zip archive: {source}")]
    NotAnArchive {
        path:   PathBuf,
        source: zip::result::ZipError,
    },

    #[error("cannot read archive central directory: {0}")]
    Unreadable(#[source] zip::result::ZipError),

    #[error("invalid entry name '{name}': {reason}")]
    InvalidEntryName { name: String, reason: &'static str },

    #[error("entry '{name}' already exists in archive")]
    DuplicateEntry { name: String },

    #[error("failed to read entry source '{path}': {source}")]
    EntrySource { path: PathBuf, source: io::Error },

    #[error("failed to write archive: {0}")]
    Write(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
