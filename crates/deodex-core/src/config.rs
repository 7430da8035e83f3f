use std::path::PathBuf;

use crate::error::Result;

pub const DEFAULT_VDEX_EXTRACTOR: &str = "vdexExtractor";
pub const DEFAULT_ZIPALIGN: &str = "zipalign";
pub const DEFAULT_ALIGNMENT: u32 = 4;
pub const DEFAULT_EXTRACTOR_VERBOSITY: u8 = 2;

/// Everything a [`Deodexer`](crate::Deodexer) needs to know about its
/// environment. Passed by value; nothing here is global.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub vdex_extractor:            PathBuf,
    pub zipalign:                  PathBuf,
    /// Byte alignment passed to zipalign in both modes.
    pub alignment:                 u32,
    /// `-v` level passed to the extractor.
    pub extractor_verbosity:       u8,
    /// Parent of extraction workspaces; the system temp dir when unset.
    pub scratch_dir:               Option<PathBuf>,
    /// Leave a failed container's optimized files in place.
    pub keep_artifacts_on_failure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vdex_extractor:            PathBuf::from(DEFAULT_VDEX_EXTRACTOR),
            zipalign:                  PathBuf::from(DEFAULT_ZIPALIGN),
            alignment:                 DEFAULT_ALIGNMENT,
            extractor_verbosity:       DEFAULT_EXTRACTOR_VERBOSITY,
            scratch_dir:               None,
            keep_artifacts_on_failure: false,
        }
    }
}

impl Config {
    pub fn new() -> Self { Self::default() }

    pub fn vdex_extractor(mut self, path: impl Into<PathBuf>) -> Self {
        self.vdex_extractor = path.into();
        self
    }

    pub fn zipalign(mut self, path: impl Into<PathBuf>) -> Self {
        self.zipalign = path.into();
        self
    }

    pub fn alignment(mut self, alignment: u32) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn extractor_verbosity(mut self, verbosity: u8) -> Self {
        self.extractor_verbosity = verbosity;
        self
    }

    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    pub fn keep_artifacts_on_failure(mut self, keep: bool) -> Self {
        self.keep_artifacts_on_failure = keep;
        self
    }

    /// Replace both tool names with resolved executable paths.
    ///
    /// This is the setup check: a missing tool fails here, before any file
    /// in the tree is touched.
    pub fn resolve_tools(mut self) -> Result<Self> {
        self.vdex_extractor = deodex_platform::resolve("vdexExtractor", &self.vdex_extractor)?;
        self.zipalign = deodex_platform::resolve("zipalign", &self.zipalign)?;
        Ok(self)
    }

    pub fn workspace_root(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}
