pub mod content;
pub mod error;
pub mod loader;
pub mod models;
pub mod service;

// Re-export commonly used types
pub use content::{ContentHandle, SharedContent};
pub use error::{BoxError, RescopeError, Result};
pub use loader::{LoadError, ResourceLoader};
pub use models::*;
pub use service::{ServiceCandidate, ServiceResolver};
