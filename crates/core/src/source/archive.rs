//! Archive (zip/jar) root enumeration.

use super::content::ArchiveEntryContent;
use rescope_api::{ResourceDescriptor, RescopeError, Result, RootId};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;
use zip::ZipArchive;

fn open(path: &Path) -> io::Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path)?;
    ZipArchive::new(BufReader::new(file)).map_err(io::Error::other)
}

/// Check that `path` opens as a zip archive
pub(crate) fn validate(path: &Path) -> Result<()> {
    open(path)
        .map(|_| ())
        .map_err(|e| RescopeError::invalid_source(path, format!("not a valid archive: {}", e)))
}

/// Stored entry name with `\` normalized to `/` and no leading separator
pub(crate) fn normalize_entry_name(raw: &str) -> String {
    raw.replace('\\', "/").trim_start_matches('/').to_string()
}

/// List file entries in central-directory order, skipping directory markers
pub(crate) fn enumerate(id: RootId, path: &Path) -> Result<Vec<ResourceDescriptor>> {
    let subject = || path.display().to_string();
    let mut archive = open(path).map_err(|e| RescopeError::io(subject(), e))?;
    let mut resources = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let raw = {
            let entry = archive
                .by_index_raw(i)
                .map_err(|e| RescopeError::io(subject(), io::Error::other(e)))?;
            entry.name().to_string()
        };

        let name = normalize_entry_name(&raw);
        if name.is_empty() || name.ends_with('/') {
            continue;
        }

        resources.push(ResourceDescriptor::new(
            name,
            id,
            Arc::new(ArchiveEntryContent::new(path, raw)),
        ));
    }

    Ok(resources)
}
