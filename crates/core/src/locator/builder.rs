use super::ResourceLocator;
use crate::config::LocatorConfig;
use crate::index::ResourceIndex;
use crate::source::SourceRoot;
use rescope_api::{RescopeError, Result};
use std::path::Path;
use tracing::debug;

/// Collects source roots, then enumerates them into a [`ResourceLocator`].
///
/// Directory and archive roots are validated as they are added, so a bad
/// path fails at the call that named it.
#[derive(Debug, Default)]
pub struct LocatorBuilder {
    roots: Vec<SourceRoot>,
    config: LocatorConfig,
}

impl LocatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_directory(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.roots.push(SourceRoot::directory(path)?);
        Ok(self)
    }

    pub fn add_archive(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.roots.push(SourceRoot::archive(path)?);
        Ok(self)
    }

    /// Add a group of roots, searched in the given order
    pub fn add_aggregate(mut self, roots: impl IntoIterator<Item = SourceRoot>) -> Self {
        self.roots.push(SourceRoot::aggregate(roots));
        self
    }

    pub fn add_root(mut self, root: SourceRoot) -> Self {
        self.roots.push(root);
        self
    }

    pub fn with_config(mut self, config: LocatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Roots added so far, in search order
    pub fn roots(&self) -> &[SourceRoot] {
        &self.roots
    }

    pub fn build(self) -> Result<ResourceLocator> {
        if self.roots.is_empty() {
            return Err(RescopeError::InvalidState(
                "no source roots registered".to_string(),
            ));
        }
        debug!("Building locator over {} roots", self.roots.len());
        let index = ResourceIndex::build(&self.roots, &self.config)?;
        Ok(ResourceLocator::new(index, self.config))
    }
}
