//! Orchestrator: walk a system tree and run every container through
//! locate → check → extract → inject → align → cleanup.
//!
//! Containers are independent. A [`ContainerError`] is recorded in the
//! [`RunReport`] and the walk moves on; an [`Error`] stops the run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use deodex_archive::is_deodexed;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::align;
use crate::artifact::{ArtifactSet, locate};
use crate::cleanup::remove_artifacts;
use crate::config::Config;
use crate::effects::{Aligner, Extractor, VdexExtractor, Zipalign};
use crate::error::{ContainerError, Error, PipelineError, Result};
use crate::extract::extract_first;
use crate::inject::inject;
use crate::report::{ContainerOutcome, RunReport};

/// Flat boot image files, removed wherever they are found.
pub const BOOT_IMAGE_NAMES: [&str; 3] = ["boot.art", "boot.oat", "boot.vdex"];

const CONTAINER_EXTENSIONS: [&str; 2] = ["apk", "jar"];

enum FileRole {
    Container,
    BootImage,
    Other,
}

fn classify(path: &Path) -> FileRole {
    let is_boot_image = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| BOOT_IMAGE_NAMES.contains(&name));
    if is_boot_image {
        return FileRole::BootImage;
    }

    let is_container = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CONTAINER_EXTENSIONS.contains(&ext));
    if is_container { FileRole::Container } else { FileRole::Other }
}

/// The deodex pipeline, generic over the tools it drives.
pub struct Deodexer<E = VdexExtractor, A = Zipalign> {
    config:    Config,
    extractor: E,
    aligner:   A,
}

impl Deodexer {
    /// Drive the command-line tools named in `config`.
    ///
    /// Tool names are used as given; call [`Config::resolve_tools`] first to
    /// fail early on a missing tool.
    pub fn from_config(config: Config) -> Self {
        let extractor = VdexExtractor::from_config(&config);
        let aligner = Zipalign::from_config(&config);
        Self::new(config, extractor, aligner)
    }
}

impl<E: Extractor, A: Aligner> Deodexer<E, A> {
    pub fn new(config: Config, extractor: E, aligner: A) -> Self {
        Self {
            config,
            extractor,
            aligner,
        }
    }

    /// Deodex every container under `sysroot`.
    ///
    /// Returns `Ok` whenever the walk completed, even if containers failed;
    /// check [`RunReport::is_success`] for the verdict.
    pub fn run(&self, sysroot: impl AsRef<Path>) -> Result<RunReport> {
        let root = canonical_dir(sysroot.as_ref())?;
        info!(sysroot = %root.display(), "deodexing");

        let mut report = RunReport::default();
        for path in snapshot(&root)? {
            match classify(&path) {
                FileRole::Container => {
                    report.containers += 1;
                    self.process(&root, &path, &mut report)?;
                }
                FileRole::BootImage => {
                    debug!(path = %path.display(), "removing boot image");
                    report.record_cleanup(remove_artifacts(&root, [path.as_path()])?);
                }
                FileRole::Other => {}
            }
        }

        report.log_summary();
        Ok(report)
    }

    fn process(&self, root: &Path, container: &Path, report: &mut RunReport) -> Result<()> {
        info!("Processing: {}", container.display());

        let artifacts = locate(container);
        if artifacts.is_empty() {
            debug!(container = %container.display(), "no optimized files");
            report.record(container, ContainerOutcome::NoArtifacts);
            return Ok(());
        }
        debug!(container = %container.display(), count = artifacts.len(), "found optimized files");

        let clean = match self.restore(container, &artifacts) {
            Ok(outcome) => {
                report.record(container, outcome);
                true
            }
            Err(PipelineError::Fatal(err)) => return Err(err),
            Err(PipelineError::Container(err)) => {
                // An unreadable container may not be what it claims to be.
                let clean = !matches!(err, ContainerError::InvalidContainer(_))
                    && !self.config.keep_artifacts_on_failure;
                report.record_failure(container, err);
                clean
            }
        };

        if clean {
            report.record_cleanup(remove_artifacts(root, artifacts.paths())?);
        }
        Ok(())
    }

    fn restore(&self, container: &Path, artifacts: &ArtifactSet) -> Result<ContainerOutcome, PipelineError> {
        if is_deodexed(container).map_err(ContainerError::InvalidContainer)? {
            debug!(container = %container.display(), "already deodexed");
            return Ok(ContainerOutcome::AlreadyDeodexed);
        }

        let candidates = artifacts.vdex();
        if candidates.is_empty() {
            return Err(ContainerError::NoSource.into());
        }

        let extraction = extract_first(&self.extractor, candidates, &self.config.workspace_root())?;
        let entries = inject(container, &extraction.workspace, &extraction.prefix)?;
        extraction.workspace.close().map_err(Error::Workspace)?;

        let realigned = align::normalize(&self.aligner, container)?;

        Ok(ContainerOutcome::Deodexed {
            candidate: extraction.candidate,
            entries,
            realigned,
        })
    }
}

fn canonical_dir(sysroot: &Path) -> Result<PathBuf> {
    let sysroot_error = |source: io::Error| Error::Sysroot {
        path: sysroot.to_path_buf(),
        source,
    };
    let root = fs::canonicalize(sysroot).map_err(sysroot_error)?;
    if !root.is_dir() {
        return Err(sysroot_error(io::Error::new(
            io::ErrorKind::NotADirectory,
            "not a directory",
        )));
    }
    Ok(root)
}

/// Every regular file under `root`, in file-name order, collected before
/// anything is deleted.
fn snapshot(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|source| Error::Walk {
            path: source.path().unwrap_or(root).to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
