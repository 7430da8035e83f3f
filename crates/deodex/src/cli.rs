use std::path::PathBuf;

use clap::{ArgAction, Parser};
use deodex_core::{
    Config, DEFAULT_ALIGNMENT, DEFAULT_EXTRACTOR_VERBOSITY, DEFAULT_VDEX_EXTRACTOR, DEFAULT_ZIPALIGN,
};
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(
    name = "deodex",
    about = "Restore dex bytecode into the APKs and JARs of an optimized Android system tree",
    version
)]
pub struct Cli {
    /// Root of the extracted system partition.
    #[arg(value_name = "SYSROOT")]
    pub sysroot: PathBuf,

    /// vdexExtractor executable.
    #[arg(
        long = "vdexextractor",
        value_name = "PATH",
        env = "DEODEX_VDEXEXTRACTOR",
        default_value = DEFAULT_VDEX_EXTRACTOR
    )]
    pub vdex_extractor: PathBuf,

    /// zipalign executable.
    #[arg(long, value_name = "PATH", env = "DEODEX_ZIPALIGN", default_value = DEFAULT_ZIPALIGN)]
    pub zipalign: PathBuf,

    /// Alignment in bytes passed to zipalign.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_ALIGNMENT)]
    pub alignment: u32,

    /// Verbosity level passed to vdexExtractor.
    #[arg(long, value_name = "LEVEL", default_value_t = DEFAULT_EXTRACTOR_VERBOSITY)]
    pub extractor_verbosity: u8,

    /// Where extraction workspaces are created. Defaults to the system temp dir.
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Leave optimized files in place for containers that could not be recovered.
    #[arg(long, action = ArgAction::SetTrue)]
    pub keep_artifacts_on_failure: bool,

    /// More logging; repeat for more.
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Less logging; repeat for less.
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn to_config(&self) -> Config {
        let mut config = Config::new()
            .vdex_extractor(&self.vdex_extractor)
            .zipalign(&self.zipalign)
            .alignment(self.alignment)
            .extractor_verbosity(self.extractor_verbosity)
            .keep_artifacts_on_failure(self.keep_artifacts_on_failure);
        if let Some(dir) = &self.scratch_dir {
            config = config.scratch_dir(dir);
        }
        config
    }

    /// Default log level; `RUST_LOG` overrides it.
    pub fn log_level(&self) -> LevelFilter {
        match i16::from(self.verbose) - i16::from(self.quiet) {
            ..=-2 => LevelFilter::ERROR,
            -1 => LevelFilter::WARN,
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}
