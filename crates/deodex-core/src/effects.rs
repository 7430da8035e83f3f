//! Seams for the two external tools.
//!
//! The pipeline only talks to [`Extractor`] and [`Aligner`]; the
//! command-backed implementations below are what the binary wires in.

use std::path::{Path, PathBuf};

use deodex_platform::{Command, Result};

use crate::config::Config;

/// Recovers dex files from a vdex container.
pub trait Extractor {
    /// Write `<vdex-stem>.apk_*` files into `output_dir`.
    fn extract(&self, vdex: &Path, output_dir: &Path) -> Result<()>;
}

/// Zip alignment checker and rewriter.
pub trait Aligner {
    /// `Ok(false)` means the archive needs rewriting. `Err` means the check
    /// itself could not run.
    fn is_aligned(&self, archive: &Path) -> Result<bool>;

    /// Write an aligned copy of `input` to `output`.
    fn align(&self, input: &Path, output: &Path) -> Result<()>;
}

impl<T: Extractor + ?Sized> Extractor for &T {
    fn extract(&self, vdex: &Path, output_dir: &Path) -> Result<()> {
        (**self).extract(vdex, output_dir)
    }
}

impl<T: Aligner + ?Sized> Aligner for &T {
    fn is_aligned(&self, archive: &Path) -> Result<bool> { (**self).is_aligned(archive) }

    fn align(&self, input: &Path, output: &Path) -> Result<()> { (**self).align(input, output) }
}

/// `vdexExtractor -i <vdex> -o <dir> -v <level>`
#[derive(Clone, Debug)]
pub struct VdexExtractor {
    program:   PathBuf,
    verbosity: u8,
}

impl VdexExtractor {
    pub fn new(program: impl Into<PathBuf>, verbosity: u8) -> Self {
        Self {
            program: program.into(),
            verbosity,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.vdex_extractor, config.extractor_verbosity)
    }

    fn command(&self, vdex: &Path, output_dir: &Path) -> Command {
        Command::new(&self.program)
            .arg("-i")
            .arg(vdex)
            .arg("-o")
            .arg(output_dir)
            .arg("-v")
            .arg(self.verbosity.to_string())
    }
}

impl Extractor for VdexExtractor {
    fn extract(&self, vdex: &Path, output_dir: &Path) -> Result<()> {
        self.command(vdex, output_dir).run().map(drop)
    }
}

/// `zipalign -c <n> <apk>` to check, `zipalign <n> <in> <out>` to rewrite.
#[derive(Clone, Debug)]
pub struct Zipalign {
    program:   PathBuf,
    alignment: u32,
}

impl Zipalign {
    pub fn new(program: impl Into<PathBuf>, alignment: u32) -> Self {
        Self {
            program: program.into(),
            alignment,
        }
    }

    pub fn from_config(config: &Config) -> Self { Self::new(&config.zipalign, config.alignment) }

    fn check_command(&self, archive: &Path) -> Command {
        Command::new(&self.program)
            .arg("-c")
            .arg(self.alignment.to_string())
            .arg(archive)
    }

    fn align_command(&self, input: &Path, output: &Path) -> Command {
        Command::new(&self.program)
            .arg(self.alignment.to_string())
            .arg(input)
            .arg(output)
    }
}

impl Aligner for Zipalign {
    fn is_aligned(&self, archive: &Path) -> Result<bool> {
        Ok(self.check_command(archive).output()?.success())
    }

    fn align(&self, input: &Path, output: &Path) -> Result<()> {
        self.align_command(input, output).run().map(drop)
    }
}
