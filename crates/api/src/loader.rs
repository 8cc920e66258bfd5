//! Decoding strategy contract.

use crate::content::ContentHandle;
use crate::error::{BoxError, RescopeError};
use thiserror::Error;

/// Why a loader could not produce a value
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Decode(BoxError),
}

impl LoadError {
    pub fn decode(err: impl Into<BoxError>) -> Self {
        LoadError::Decode(err.into())
    }

    /// Attach the resource name, keeping the I/O vs decode distinction
    pub fn for_resource(self, name: &str) -> RescopeError {
        match self {
            LoadError::Io(source) => RescopeError::io(name, source),
            LoadError::Decode(source) => RescopeError::Decode {
                name: name.to_string(),
                source,
            },
        }
    }
}

/// Decodes the bytes behind a [`ContentHandle`] into a typed value.
///
/// Loaders are supplied by the caller and must not assume anything about
/// where the bytes come from. Any `Fn(&dyn ContentHandle) -> Result<T, LoadError>`
/// closure is a loader.
pub trait ResourceLoader<T>: Send + Sync {
    fn load(&self, content: &dyn ContentHandle) -> Result<T, LoadError>;
}

impl<T, F> ResourceLoader<T> for F
where
    F: Fn(&dyn ContentHandle) -> Result<T, LoadError> + Send + Sync,
{
    fn load(&self, content: &dyn ContentHandle) -> Result<T, LoadError> {
        self(content)
    }
}
