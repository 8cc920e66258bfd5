//! Directory root enumeration.

use super::content::FileContent;
use rescope_api::{ResourceDescriptor, RescopeError, Result, RootId};
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Relative path with `/` separators and no leading separator.
///
/// `None` when a component is not valid UTF-8, since such a name cannot be
/// queried without losing information.
pub(crate) fn resource_name(relative: &Path) -> Option<String> {
    let segments = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(segments.join("/"))
}

/// Recursively list regular files under `root`, sorted by file name at
/// every level so enumeration order is stable across runs.
pub(crate) fn enumerate(
    id: RootId,
    root: &Path,
    follow_links: bool,
) -> Result<Vec<ResourceDescriptor>> {
    let mut resources = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(follow_links)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.loop_ancestor().is_some() => {
                warn!("Skipping symlink loop in {}: {}", root.display(), e);
                continue;
            }
            Err(e) if is_dangling_link(&e) => {
                warn!("Skipping dangling symlink in {}: {}", root.display(), e);
                continue;
            }
            Err(e) => return Err(RescopeError::io(root.display().to_string(), e.into())),
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            debug!("Entry {:?} escaped root {:?}", entry.path(), root);
            continue;
        };
        let Some(name) = resource_name(relative) else {
            warn!("Skipping {:?}: file name is not valid UTF-8", entry.path());
            continue;
        };

        resources.push(ResourceDescriptor::new(
            name,
            id,
            Arc::new(FileContent::new(entry.path())),
        ));
    }

    Ok(resources)
}

/// A followed symlink whose target does not exist
fn is_dangling_link(e: &walkdir::Error) -> bool {
    let not_found = e.io_error().map(io::Error::kind) == Some(io::ErrorKind::NotFound);
    not_found
        && e.path()
            .and_then(|p| p.symlink_metadata().ok())
            .is_some_and(|meta| meta.file_type().is_symlink())
}
