//! Stock [`ContentHandle`] implementations.

use rescope_api::ContentHandle;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use zip::ZipArchive;

/// Upper bound on the buffer reserved up front for an archive entry
const MAX_PREALLOC: u64 = 64 * 1024;

/// Content of a regular file on disk
#[derive(Debug, Clone)]
pub struct FileContent {
    path: PathBuf,
}

impl FileContent {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContentHandle for FileContent {
    fn open_stream(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        Ok(Box::new(BufReader::new(File::open(&self.path)?)))
    }

    fn read_all(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Content of one entry inside a zip/jar archive.
///
/// The archive is reopened on every read so handles hold no file
/// descriptors between reads.
#[derive(Debug, Clone)]
pub struct ArchiveEntryContent {
    archive: PathBuf,
    /// Entry name exactly as stored in the archive
    entry: String,
}

impl ArchiveEntryContent {
    pub fn new(archive: impl Into<PathBuf>, entry: impl Into<String>) -> Self {
        Self {
            archive: archive.into(),
            entry: entry.into(),
        }
    }

    pub fn archive(&self) -> &Path {
        &self.archive
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }
}

impl ContentHandle for ArchiveEntryContent {
    fn open_stream(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        Ok(Box::new(Cursor::new(self.read_all()?)))
    }

    fn read_all(&self) -> io::Result<Vec<u8>> {
        let file = File::open(&self.archive)?;
        let mut archive = ZipArchive::new(BufReader::new(file)).map_err(io::Error::other)?;
        let mut entry = archive.by_name(&self.entry).map_err(io::Error::other)?;

        // The declared size comes from the archive and may be corrupt
        let hint = usize::try_from(entry.size().min(MAX_PREALLOC)).unwrap_or(0);
        let mut bytes = Vec::with_capacity(hint);
        entry.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn describe(&self) -> String {
        format!("{}!/{}", self.archive.display(), self.entry)
    }
}

/// Content held in memory
#[derive(Debug, Clone)]
pub struct MemoryContent {
    label: String,
    bytes: Arc<[u8]>,
}

impl MemoryContent {
    pub fn new(label: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            label: label.into(),
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl ContentHandle for MemoryContent {
    fn open_stream(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        Ok(Box::new(&self.bytes[..]))
    }

    fn read_all(&self) -> io::Result<Vec<u8>> {
        Ok(self.bytes.to_vec())
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.label)
    }
}
