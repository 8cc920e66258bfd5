//! Source roots - the provenance units resources are enumerated from.
//!
//! ```text
//! SourceRoot
//!   ├── Directory(path)     walkdir, regular files only
//!   ├── Archive(path)       zip central directory, no directory markers
//!   ├── Memory(label)       prebuilt (name, bytes) table
//!   └── Aggregate([roots])  members keep their own RootId
//! ```
//!
//! Roots are validated when constructed and enumerated once, when the
//! index is built.

pub mod archive;
pub mod content;
pub mod directory;

pub use content::{ArchiveEntryContent, FileContent, MemoryContent};

use rescope_api::{ResourceDescriptor, RescopeError, Result, RootId, RootLocation};
use std::path::{Path, PathBuf};
use std::sync::Arc;

type MemoryEntries = Arc<[(String, Arc<[u8]>)]>;

#[derive(Debug, Clone)]
enum RootKind {
    Directory(PathBuf),
    Archive(PathBuf),
    Memory {
        label: String,
        entries: MemoryEntries,
    },
    Aggregate(Vec<SourceRoot>),
}

/// One origin of resources.
///
/// Cloning a root keeps its id, so the same root registered twice is
/// recognized as a duplicate.
#[derive(Debug, Clone)]
pub struct SourceRoot {
    id: RootId,
    kind: RootKind,
}

impl SourceRoot {
    /// A directory tree; fails with `InvalidSource` if `path` is not a directory
    pub fn directory(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(RescopeError::invalid_source(path, "not a directory"));
        }
        Ok(Self {
            id: RootId::next(),
            kind: RootKind::Directory(path.to_path_buf()),
        })
    }

    /// A zip or jar archive; fails with `InvalidSource` if it does not open
    pub fn archive(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        archive::validate(path)?;
        Ok(Self {
            id: RootId::next(),
            kind: RootKind::Archive(path.to_path_buf()),
        })
    }

    /// A fixed in-memory table of resources
    pub fn in_memory<N, B>(label: impl Into<String>, entries: impl IntoIterator<Item = (N, B)>) -> Self
    where
        N: Into<String>,
        B: Into<Arc<[u8]>>,
    {
        let entries: Vec<(String, Arc<[u8]>)> = entries
            .into_iter()
            .map(|(name, bytes)| (name.into(), bytes.into()))
            .collect();
        Self {
            id: RootId::next(),
            kind: RootKind::Memory {
                label: label.into(),
                entries: entries.into(),
            },
        }
    }

    /// A group of roots searched in the given order
    pub fn aggregate(members: impl IntoIterator<Item = SourceRoot>) -> Self {
        Self {
            id: RootId::next(),
            kind: RootKind::Aggregate(members.into_iter().collect()),
        }
    }

    pub fn id(&self) -> RootId {
        self.id
    }

    /// Location of a leaf root; `None` for aggregates
    pub fn location(&self) -> Option<RootLocation> {
        match &self.kind {
            RootKind::Directory(p) => Some(RootLocation::Directory(p.clone())),
            RootKind::Archive(p) => Some(RootLocation::Archive(p.clone())),
            RootKind::Memory { label, .. } => Some(RootLocation::Memory(label.clone())),
            RootKind::Aggregate(_) => None,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self.kind, RootKind::Aggregate(_))
    }

    /// Direct members of an aggregate (empty for leaf roots)
    pub fn members(&self) -> &[SourceRoot] {
        match &self.kind {
            RootKind::Aggregate(members) => members,
            _ => &[],
        }
    }

    /// Leaf roots in search order, aggregates flattened depth first
    pub fn leaves(&self) -> Vec<&SourceRoot> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a SourceRoot>) {
        match &self.kind {
            RootKind::Aggregate(members) => {
                for member in members {
                    member.collect_leaves(out);
                }
            }
            _ => out.push(self),
        }
    }

    /// Enumerate the resources of a leaf root.
    ///
    /// Aggregates own no resources themselves; callers enumerate
    /// [`SourceRoot::leaves`] instead.
    pub fn enumerate(&self, follow_links: bool) -> Result<Vec<ResourceDescriptor>> {
        match &self.kind {
            RootKind::Directory(path) => directory::enumerate(self.id, path, follow_links),
            RootKind::Archive(path) => archive::enumerate(self.id, path),
            RootKind::Memory { label, entries } => Ok(entries
                .iter()
                .map(|(name, bytes)| {
                    ResourceDescriptor::new(
                        name.trim_start_matches('/'),
                        self.id,
                        Arc::new(MemoryContent::new(
                            format!("{}/{}", label, name),
                            bytes.clone(),
                        )),
                    )
                })
                .collect()),
            RootKind::Aggregate(_) => Ok(Vec::new()),
        }
    }

    /// Key used to detect the same location registered twice
    pub(crate) fn dedup_key(&self) -> Option<PathBuf> {
        match &self.kind {
            RootKind::Directory(p) | RootKind::Archive(p) => {
                Some(p.canonicalize().unwrap_or_else(|_| p.clone()))
            }
            _ => None,
        }
    }
}
