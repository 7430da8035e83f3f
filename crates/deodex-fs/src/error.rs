use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to rename '{from}' to '{to}': {source}")]
    Rename {
        from:   PathBuf,
        to:     PathBuf,
        source: io::Error,
    },

    #[error("failed to remove '{path}': {source}")]
    Remove { path: PathBuf, source: io::Error },

    #[error("path has no file name: {0}")]
    NoFileName(PathBuf),

    #[error("'{path}' is outside of '{root}'")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;
