//! Extraction coordinator: try each vdex candidate until one yields dex files.

use std::path::{Path, PathBuf};

use deodex_fs::Workspace;
use tracing::{debug, warn};

use crate::effects::Extractor;
use crate::error::{CandidateError, ContainerError, Error, PipelineError};

const WORKSPACE_PREFIX: &str = "deodex-";

/// Output of the first candidate that worked.
#[derive(Debug)]
pub struct Extraction {
    pub candidate: PathBuf,
    /// `<candidate-stem>.apk_`, the prefix every extracted file carries.
    pub prefix:    String,
    pub workspace: Workspace,
}

/// Prefix the extractor gives files recovered from `vdex`.
pub fn naming_prefix(vdex: &Path) -> String {
    let stem = vdex.file_stem().unwrap_or_default().to_string_lossy();
    format!("{stem}.apk_")
}

/// Run the extractor over `candidates` in order, each into a fresh workspace
/// under `scratch`, stopping at the first success.
///
/// A candidate fails when the tool fails or leaves its workspace empty. Each
/// candidate is attempted at most once. When all of them fail, the error
/// names the last one.
pub fn extract_first<E: Extractor>(
    extractor: &E,
    candidates: &[PathBuf],
    scratch: &Path,
) -> Result<Extraction, PipelineError> {
    let mut last_failure = None;

    for candidate in candidates {
        let workspace = Workspace::new_in(scratch, WORKSPACE_PREFIX).map_err(Error::Workspace)?;
        debug!(
            candidate = %candidate.display(),
            workspace = %workspace.path().display(),
            "extracting vdex"
        );

        let failure = match extractor.extract(candidate, workspace.path()) {
            Err(err) => CandidateError::Tool(err),
            Ok(()) => {
                if !workspace.is_empty().map_err(Error::Workspace)? {
                    return Ok(Extraction {
                        candidate: candidate.clone(),
                        prefix: naming_prefix(candidate),
                        workspace,
                    });
                }
                CandidateError::EmptyOutput
            }
        };

        warn!(candidate = %candidate.display(), error = %failure, "vdex candidate failed");
        last_failure = Some((candidate, failure));
    }

    let error = match last_failure {
        Some((candidate, source)) => ContainerError::Extraction {
            candidate: candidate.clone(),
            source,
        },
        None => ContainerError::NoSource,
    };
    Err(error.into())
}
