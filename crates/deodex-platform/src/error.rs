use std::process::ExitStatus;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{tool} executable not found: {program}")]
    ToolNotFound {
        tool:    &'static str,
        program: String,
        #[source]
        source:  which::Error,
    },

    #[error("failed to run {cmd}: {source}")]
    CommandFailed { cmd: String, source: std::io::Error },

    #[error("{cmd} exited with {status}{}", stderr_suffix(.stderr))]
    ExitStatus {
        cmd:    String,
        status: ExitStatus,
        stderr: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    match stderr.trim() {
        "" => String::new(),
        s => format!(": {s}"),
    }
}
