mod cli;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use deodex_core::{Deodexer, RunReport};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(report) if report.is_success() => ExitCode::SUCCESS,
        Ok(report) => {
            eprintln!("Failed to deodex:");
            for failure in &report.failures {
                eprintln!("- {}", failure.path.display());
            }
            ExitCode::from(1)
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<RunReport> {
    let config = cli.to_config().resolve_tools().context("required tool is missing")?;
    Deodexer::from_config(config)
        .run(&cli.sysroot)
        .with_context(|| format!("deodexing {} aborted", cli.sysroot.display()))
}

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::builder()
        .with_default_directive(cli.log_level().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
