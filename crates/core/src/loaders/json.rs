use rescope_api::{ContentHandle, LoadError, ResourceLoader};
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;

/// Deserializes a JSON document into `T`
pub struct JsonLoader<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonLoader<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonLoader<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonLoader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsonLoader<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned> ResourceLoader<T> for JsonLoader<T> {
    fn load(&self, content: &dyn ContentHandle) -> Result<T, LoadError> {
        let reader = content.open_stream()?;
        serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                LoadError::Io(e.into())
            } else {
                LoadError::decode(e)
            }
        })
    }
}
