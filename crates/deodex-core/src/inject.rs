//! Container injector: merge extracted dex files into a container in one
//! atomic rewrite.

use std::fs;
use std::path::Path;

use deodex_archive::{NewEntry, append_entries, validate_entry_name};
use deodex_fs::{StagedFile, Workspace};
use tracing::{debug, warn};

use crate::error::{ContainerError, Error, PipelineError};

fn inject_error(container: &Path, source: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::Inject {
        path:   container.to_path_buf(),
        source: Box::new(source),
    }
}

/// Map every workspace file to the archive entry it becomes.
///
/// All entries are checked before anything is returned: a single one that is
/// not a regular file, lacks `prefix`, or would strip to an unusable entry
/// name rejects the whole set.
pub fn plan_entries(workspace: &Workspace, prefix: &str) -> Result<Vec<NewEntry>, PipelineError> {
    let files = workspace.entries().map_err(Error::Workspace)?;

    let mut entries = Vec::with_capacity(files.len());
    for file in &files {
        let name = Some(&file.name)
            .filter(|_| file.is_file())
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix(prefix))
            .filter(|entry| validate_entry_name(entry).is_ok());

        let Some(entry) = name else {
            let listing: Vec<_> = files.iter().map(|f| f.name.to_string_lossy()).collect();
            warn!(workspace = %workspace.path().display(), files = ?listing, "unexpected dex dir contents");
            return Err(ContainerError::NamingMismatch {
                name:   file.name.to_string_lossy().into_owned(),
                prefix: prefix.to_owned(),
            }
            .into());
        };
        entries.push(NewEntry::new(entry, &file.path));
    }
    Ok(entries)
}

/// Append the workspace's dex files to `container`.
///
/// The container is copied to a sibling temp file, extended there, given the
/// original permissions and renamed back over the original. Any failure
/// before that rename removes the temp file and leaves the container as it
/// was. Returns the names of the added entries.
pub fn inject(container: &Path, workspace: &Workspace, prefix: &str) -> Result<Vec<String>, PipelineError> {
    let entries = plan_entries(workspace, prefix)?;

    let permissions = fs::metadata(container)
        .map_err(|e| inject_error(container, e))?
        .permissions();
    let mut staged = StagedFile::copy_of(container).map_err(|e| inject_error(container, e))?;

    if let Err(err) = append_entries(staged.as_file_mut(), &entries) {
        return Err(match err {
            deodex_archive::Error::DuplicateEntry { name } => ContainerError::EntryConflict { name }.into(),
            other => inject_error(container, other).into(),
        });
    }

    staged
        .set_permissions(permissions)
        .and_then(|()| staged.commit(container))
        .map_err(|e| inject_error(container, e))?;

    let names: Vec<_> = entries.into_iter().map(|e| e.name).collect();
    debug!(container = %container.display(), entries = ?names, "injected dex files");
    Ok(names)
}
