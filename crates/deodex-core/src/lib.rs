//! Recover bytecode for an Android system tree that was optimized ahead of
//! time.
//!
//! For every `.apk` and `.jar` under the tree, [`Deodexer::run`] finds the
//! companion `.vdex`/`.odex`/`.oat`/`.art` files, extracts dex files from a
//! vdex, appends them to the container, re-aligns it and deletes the
//! companions.
//!
//! The external tools sit behind the [`Extractor`] and [`Aligner`] traits.

pub mod align;
pub mod artifact;
pub mod cleanup;
mod config;
pub mod effects;
mod error;
pub mod extract;
pub mod inject;
mod pipeline;
mod report;

pub use artifact::{ArtifactKind, ArtifactSet, locate};
pub use cleanup::CleanupStats;
pub use config::{
    Config, DEFAULT_ALIGNMENT, DEFAULT_EXTRACTOR_VERBOSITY, DEFAULT_VDEX_EXTRACTOR, DEFAULT_ZIPALIGN,
};
pub use effects::{Aligner, Extractor, VdexExtractor, Zipalign};
pub use error::{CandidateError, Chain, ContainerError, Error, PipelineError, Result};
pub use pipeline::{BOOT_IMAGE_NAMES, Deodexer};
pub use report::{ContainerFailure, ContainerOutcome, RunReport};
