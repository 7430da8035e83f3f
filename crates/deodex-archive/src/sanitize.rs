use crate::error::{Error, Result};

/// Reject entry names that would not land as a single top-level member.
///
/// Injected entries are always flat (`classes.dex`, `classes2.dex`, ...), so
/// separators and relative components are treated as corruption rather than
/// normalized away.
pub fn validate_entry_name(name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        "empty name"
    } else if name == "." || name == ".." {
        "relative path component"
    } else if name.contains(['/', '\\']) {
        "contains a path separator"
    } else if name.contains('\0') {
        "contains a null byte"
    } else {
        return Ok(());
    };

    Err(Error::InvalidEntryName {
        name: name.to_owned(),
        reason,
    })
}
