//! Error types for the deodex pipeline.
//!
//! Failures come in two tiers. [`ContainerError`] is confined to a single
//! container: it is recorded in the run report and the walk moves on.
//! [`Error`] is fatal and ends the run. A container pipeline returns
//! [`PipelineError`], which carries either one.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why a single extraction candidate was rejected.
#[derive(Debug, Error)]
pub enum CandidateError {
    #[error(transparent)]
    Tool(#[from] deodex_platform::Error),

    #[error("extractor produced no files")]
    EmptyOutput,
}

/// Recoverable, per-container failure.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("cannot open container as an archive")]
    InvalidContainer(#[source] deodex_archive::Error),

    #[error("no vdex files found")]
    NoSource,

    #[error("failed to extract vdex: {}", candidate.display())]
    Extraction {
        candidate: PathBuf,
        #[source]
        source:    CandidateError,
    },

    #[error("found unknown file in dex dir: {name} (expected prefix '{prefix}')")]
    NamingMismatch { name: String, prefix: String },

    #[error("container already has an entry named '{name}'")]
    EntryConflict { name: String },
}

/// Fatal failure; aborts the whole run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Setup(#[from] deodex_platform::Error),

    #[error("sysroot '{}' is not a usable directory: {source}", path.display())]
    Sysroot {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("failed to walk '{}': {source}", path.display())]
    Walk {
        path:   PathBuf,
        source: walkdir::Error,
    },

    #[error("extraction workspace failed: {0}")]
    Workspace(#[source] deodex_fs::Error),

    #[error("failed to add dex files to '{}': {source}", path.display())]
    Inject { path: PathBuf, source: BoxError },

    #[error("failed to check alignment of '{}': {source}", path.display())]
    AlignCheck {
        path:   PathBuf,
        source: deodex_platform::Error,
    },

    #[error("failed to zipalign '{}': {source}", path.display())]
    AlignRewrite { path: PathBuf, source: BoxError },

    #[error("failed to clean up optimized files: {0}")]
    Cleanup(#[source] deodex_fs::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Outcome of a failed container pipeline: either recorded or fatal.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Fatal(#[from] Error),
}

/// Displays an error followed by its `source()` chain, `: `-separated.
pub struct Chain<'a>(pub &'a (dyn std::error::Error + 'static));

impl fmt::Display for Chain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(err) = source {
            write!(f, ": {err}")?;
            source = err.source();
        }
        Ok(())
    }
}
