use std::ffi::OsStr;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Resolve `program` to an executable path.
///
/// Bare names are looked up on `PATH`; anything containing a separator is
/// checked in place. `tool` names the role for error messages.
pub fn resolve(tool: &'static str, program: impl AsRef<OsStr>) -> Result<PathBuf> {
    let program = program.as_ref();
    let path = which::which(program).map_err(|source| Error::ToolNotFound {
        tool,
        program: program.to_string_lossy().into_owned(),
        source,
    })?;
    tracing::debug!(tool, path = %path.display(), "resolved external tool");
    Ok(path)
}
