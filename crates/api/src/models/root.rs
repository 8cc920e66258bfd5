use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_ROOT_ID: AtomicU32 = AtomicU32::new(1);

/// Process-unique identity of a source root.
///
/// Ids are handed out when a root is constructed and never reused, so two
/// roots built from the same path still have distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId(u32);

impl RootId {
    /// Allocate a fresh id
    pub fn next() -> Self {
        Self(NEXT_ROOT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "root#{}", self.0)
    }
}

/// Where a leaf root reads its resources from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RootLocation {
    /// A directory tree on disk
    Directory(PathBuf),
    /// A zip/jar archive on disk
    Archive(PathBuf),
    /// An in-memory table, identified by a label
    Memory(String),
}

impl RootLocation {
    /// Get the location kind as a string (for statistics and logging)
    pub fn kind(&self) -> &'static str {
        match self {
            RootLocation::Directory(_) => "directory",
            RootLocation::Archive(_) => "archive",
            RootLocation::Memory(_) => "memory",
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            RootLocation::Directory(p) | RootLocation::Archive(p) => Some(p),
            RootLocation::Memory(_) => None,
        }
    }
}

impl fmt::Display for RootLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootLocation::Directory(p) | RootLocation::Archive(p) => {
                write!(f, "{}:{}", self.kind(), p.display())
            }
            RootLocation::Memory(label) => write!(f, "memory:{}", label),
        }
    }
}

/// Public description of one leaf root in an index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootInfo {
    pub id: RootId,
    pub location: RootLocation,
    /// Number of resources the root contributed
    pub resource_count: usize,
}
