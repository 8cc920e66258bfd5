//! Service-provider resolution contract.

use crate::error::BoxError;
use crate::models::RootId;

/// One implementation name declared for a service, with the root that
/// declared it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceCandidate {
    pub name: String,
    pub root: RootId,
}

impl ServiceCandidate {
    pub fn new(name: impl Into<String>, root: RootId) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }
}

/// Resolves a declared implementation name to a descriptor of type `D`.
///
/// The owning root is passed along so a resolver can scope names to the
/// roots that are allowed to provide them.
pub trait ServiceResolver<D>: Send + Sync {
    fn resolve(&self, name: &str, root: RootId) -> Result<D, BoxError>;
}

impl<D, F> ServiceResolver<D> for F
where
    F: Fn(&str, RootId) -> Result<D, BoxError> + Send + Sync,
{
    fn resolve(&self, name: &str, root: RootId) -> Result<D, BoxError> {
        self(name, root)
    }
}
