//! Per-run bookkeeping.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::cleanup::CleanupStats;
use crate::error::{Chain, ContainerError};

/// What the pipeline did to one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerOutcome {
    /// No companion artifacts; nothing was opened or touched.
    NoArtifacts,
    /// Already carried `classes.dex`; only artifacts were removed.
    AlreadyDeodexed,
    Deodexed {
        candidate: PathBuf,
        entries:   Vec<String>,
        realigned: bool,
    },
}

/// A container that could not be recovered, and why.
#[derive(Debug)]
pub struct ContainerFailure {
    pub path:  PathBuf,
    pub error: ContainerError,
}

/// Summary of a [`Deodexer::run`](crate::Deodexer::run).
#[derive(Debug, Default)]
pub struct RunReport {
    /// `.apk`/`.jar` files visited.
    pub containers:        usize,
    pub deodexed:          Vec<PathBuf>,
    pub already_deodexed:  usize,
    pub untouched:         usize,
    pub artifacts_removed: usize,
    pub dirs_removed:      usize,
    pub failures:          Vec<ContainerFailure>,
}

impl RunReport {
    /// True when no container failed.
    pub fn is_success(&self) -> bool { self.failures.is_empty() }

    pub(crate) fn record(&mut self, path: &Path, outcome: ContainerOutcome) {
        match outcome {
            ContainerOutcome::NoArtifacts => self.untouched += 1,
            ContainerOutcome::AlreadyDeodexed => self.already_deodexed += 1,
            ContainerOutcome::Deodexed { .. } => self.deodexed.push(path.to_path_buf()),
        }
    }

    pub(crate) fn record_failure(&mut self, path: &Path, error: ContainerError) {
        warn!(container = %path.display(), "{}", Chain(&error));
        self.failures.push(ContainerFailure {
            path: path.to_path_buf(),
            error,
        });
    }

    pub(crate) fn record_cleanup(&mut self, stats: CleanupStats) {
        self.artifacts_removed += stats.files;
        self.dirs_removed += stats.dirs;
    }

    pub(crate) fn log_summary(&self) {
        info!(
            containers = self.containers,
            deodexed = self.deodexed.len(),
            already_deodexed = self.already_deodexed,
            untouched = self.untouched,
            failed = self.failures.len(),
            artifacts_removed = self.artifacts_removed,
            dirs_removed = self.dirs_removed,
            "deodex finished"
        );
    }
}
