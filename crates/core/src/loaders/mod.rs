//! Stock [`ResourceLoader`] implementations.
//!
//! Callers can always pass their own loader (any matching closure works);
//! these cover the formats resources are most commonly stored in.

pub mod json;
pub mod properties;
pub mod xml;

pub use json::JsonLoader;
pub use properties::{Encoding, Properties, PropertiesError, PropertiesLoader};
pub use xml::{XmlPropertiesError, XmlPropertiesLoader};

use rescope_api::{ContentHandle, LoadError, ResourceLoader};

/// Raw bytes, unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesLoader;

impl ResourceLoader<Vec<u8>> for BytesLoader {
    fn load(&self, content: &dyn ContentHandle) -> Result<Vec<u8>, LoadError> {
        Ok(content.read_all()?)
    }
}

/// UTF-8 text; invalid UTF-8 is a decode error
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLoader;

impl ResourceLoader<String> for TextLoader {
    fn load(&self, content: &dyn ContentHandle) -> Result<String, LoadError> {
        String::from_utf8(content.read_all()?).map_err(LoadError::decode)
    }
}
