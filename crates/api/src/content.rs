//! Byte-content source abstraction.
//!
//! A [`ContentHandle`] is how every resource exposes its bytes. The engine
//! never reads a resource eagerly; handles are opened only when a loader
//! asks for the content.

use std::fmt::Debug;
use std::io::{self, Read};
use std::sync::Arc;

/// A readable source of bytes for one resource
pub trait ContentHandle: Send + Sync + Debug {
    /// Open a fresh stream positioned at the first byte
    fn open_stream(&self) -> io::Result<Box<dyn Read + Send + '_>>;

    /// Read the whole content into memory
    fn read_all(&self) -> io::Result<Vec<u8>> {
        let mut stream = self.open_stream()?;
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Human readable origin of the bytes (for logging and errors)
    fn describe(&self) -> String;
}

/// Shared, cheaply clonable content handle
pub type SharedContent = Arc<dyn ContentHandle>;
