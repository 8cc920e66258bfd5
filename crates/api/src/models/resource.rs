use super::root::RootId;
use crate::content::SharedContent;
use std::fmt;

/// One named resource contributed by a root.
///
/// Descriptors are immutable and cheap to clone: the content handle is
/// shared, not copied.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    name: String,
    origin: RootId,
    content: SharedContent,
}

impl ResourceDescriptor {
    pub fn new(name: impl Into<String>, origin: RootId, content: SharedContent) -> Self {
        Self {
            name: name.into(),
            origin,
            content,
        }
    }

    /// `/`-delimited name relative to the root, without a leading separator
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Id of the root that produced this resource
    pub fn origin(&self) -> RootId {
        self.origin
    }

    pub fn content(&self) -> &SharedContent {
        &self.content
    }

    /// Last path segment of the name
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.origin)
    }
}
