pub mod cache;
pub mod config;
pub mod glob;
pub mod index;
pub mod loaders;
pub mod locator;
pub mod logging;
pub mod source;

pub use cache::{CachedResource, ReclaimableSlot};
pub use config::{LocatorConfig, Retention};
pub use glob::Glob;
pub use index::{IndexStats, ResourceIndex};
pub use locator::{LocatorBuilder, NameQuery, ResourceLocator, ServiceRegistry};
pub use source::SourceRoot;

pub use rescope_api::{
    BoxError, ContentHandle, LoadError, ResourceDescriptor, ResourceLoader, RescopeError, Result,
    RootId, RootInfo, RootLocation, ServiceCandidate, ServiceResolver,
};
