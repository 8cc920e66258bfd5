//! Service-provider discovery.
//!
//! A root declares implementations of a service in the resource
//! `<service_prefix>/<service>`: UTF-8 text, one implementation name per
//! line, `#` starts a comment. Declarations are read root by root in search
//! order and are not de-duplicated across roots.

use super::ResourceLocator;
use rescope_api::{
    BoxError, ResourceDescriptor, RescopeError, Result, RootId, ServiceCandidate, ServiceResolver,
};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

impl ResourceLocator {
    /// Implementation names declared for `service`, in root order.
    ///
    /// A declaration that cannot be read or is not UTF-8 yields a single
    /// `Err` item for its root; other roots are unaffected.
    pub fn service_candidates<'a>(
        &'a self,
        service: &str,
    ) -> impl Iterator<Item = Result<ServiceCandidate>> + 'a {
        let resource = self.config.service_resource_name(service);
        self.index
            .roots()
            .filter_map(move |root| self.index.get(root, &resource))
            .flat_map(read_declaration)
    }

    /// Resolve every declared implementation of `service` with `resolver`
    pub fn services<'a, D, R>(
        &'a self,
        service: &str,
        resolver: &'a R,
    ) -> impl Iterator<Item = Result<D>> + 'a
    where
        D: 'a,
        R: ServiceResolver<D> + ?Sized,
    {
        self.service_candidates(service).map(move |candidate| {
            let candidate = candidate?;
            resolver
                .resolve(&candidate.name, candidate.root)
                .map_err(|source| {
                    warn!(
                        "Cannot resolve service provider {} from {}: {}",
                        candidate.name, candidate.root, source
                    );
                    RescopeError::Resolution {
                        name: candidate.name,
                        root: candidate.root,
                        source,
                    }
                })
        })
    }
}

fn read_declaration(descriptor: &ResourceDescriptor) -> Vec<Result<ServiceCandidate>> {
    let bytes = match descriptor.content().read_all() {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to read {}: {}", descriptor.content().describe(), e);
            return vec![Err(RescopeError::io(descriptor.name(), e))];
        }
    };
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("{} is not valid UTF-8", descriptor.content().describe());
            return vec![Err(RescopeError::Decode {
                name: descriptor.name().to_string(),
                source: Box::new(e),
            })];
        }
    };

    let names = parse_declarations(&text);
    debug!(
        "{} declares {} providers in {}",
        descriptor.name(),
        names.len(),
        descriptor.origin()
    );
    names
        .into_iter()
        .map(|name| Ok(ServiceCandidate::new(name, descriptor.origin())))
        .collect()
}

/// Non-blank lines with `#` comments removed, in file order
fn parse_declarations(text: &str) -> Vec<&str> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .collect()
}

#[derive(Debug, Error)]
#[error("no provider registered for '{name}' in {root}")]
pub struct UnknownProvider {
    pub name: String,
    pub root: RootId,
}

/// A [`ServiceResolver`] backed by a fixed table.
///
/// Entries registered with [`ServiceRegistry::register_for`] only resolve
/// when declared by that root and take precedence over unscoped entries.
#[derive(Debug, Clone)]
pub struct ServiceRegistry<D> {
    unscoped: HashMap<String, D>,
    scoped: HashMap<(RootId, String), D>,
}

impl<D> Default for ServiceRegistry<D> {
    fn default() -> Self {
        Self {
            unscoped: HashMap::new(),
            scoped: HashMap::new(),
        }
    }
}

impl<D> ServiceRegistry<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `name` to `descriptor` whichever root declares it
    pub fn register(&mut self, name: impl Into<String>, descriptor: D) -> &mut Self {
        self.unscoped.insert(name.into(), descriptor);
        self
    }

    /// Resolve `name` to `descriptor` only when declared by `root`
    pub fn register_for(
        &mut self,
        root: RootId,
        name: impl Into<String>,
        descriptor: D,
    ) -> &mut Self {
        self.scoped.insert((root, name.into()), descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.unscoped.len() + self.scoped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unscoped.is_empty() && self.scoped.is_empty()
    }
}

impl<D: Clone + Send + Sync> ServiceResolver<D> for ServiceRegistry<D> {
    fn resolve(&self, name: &str, root: RootId) -> std::result::Result<D, BoxError> {
        self.scoped
            .get(&(root, name.to_string()))
            .or_else(|| self.unscoped.get(name))
            .cloned()
            .ok_or_else(|| {
                UnknownProvider {
                    name: name.to_string(),
                    root,
                }
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocatorConfig;
    use crate::source::SourceRoot;

    #[test]
    fn test_parse_declarations() {
        let text = "# providers\ncom.a.One\n\n  com.a.Two  # inline\n   \n#com.a.Skipped\ncom.a.Three";
        assert_eq!(
            parse_declarations(text),
            vec!["com.a.One", "com.a.Two", "com.a.Three"]
        );
    }

    #[test]
    fn test_custom_prefix() {
        let root = SourceRoot::in_memory("m", [("plugins/Codec", b"impl.Codec".to_vec())]);
        let locator = ResourceLocator::builder()
            .add_root(root)
            .with_config(LocatorConfig::default().with_service_prefix("plugins/"))
            .build()
            .unwrap();

        let names: Vec<String> = locator
            .service_candidates("Codec")
            .map(|c| c.unwrap().name)
            .collect();
        assert_eq!(names, vec!["impl.Codec"]);
    }

    #[test]
    fn test_undecodable_declaration_is_one_error() {
        let bad = SourceRoot::in_memory("bad", [("META-INF/services/S", vec![0xFF, 0x0A])]);
        let good = SourceRoot::in_memory("good", [("META-INF/services/S", b"ok.Impl".to_vec())]);
        let locator = ResourceLocator::builder()
            .add_root(bad)
            .add_root(good)
            .build()
            .unwrap();

        let items: Vec<_> = locator.service_candidates("S").collect();
        assert_eq!(items.len(), 2);
        assert!(matches!(&items[0], Err(RescopeError::Decode { .. })));
        assert_eq!(items[1].as_ref().unwrap().name, "ok.Impl");
    }

    #[test]
    fn test_registry_scoping() {
        let trusted = RootId::next();
        let other = RootId::next();
        let mut registry = ServiceRegistry::new();
        registry
            .register("com.a.Shared", "shared")
            .register_for(trusted, "com.a.Private", "private");

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.resolve("com.a.Shared", other).unwrap(), "shared");
        assert_eq!(registry.resolve("com.a.Private", trusted).unwrap(), "private");

        let err = registry.resolve("com.a.Private", other).unwrap_err();
        assert!(err.to_string().contains("com.a.Private"));
    }

    #[test]
    fn test_unresolvable_candidate_does_not_stop_iteration() {
        let root = SourceRoot::in_memory(
            "m",
            [("META-INF/services/S", b"known\nunknown\nknown2".to_vec())],
        );
        let locator = ResourceLocator::builder().add_root(root).build().unwrap();

        let mut registry = ServiceRegistry::new();
        registry.register("known", 1).register("known2", 2);

        let results: Vec<Result<i32>> = locator.services("S", &registry).collect();
        assert_eq!(results.len(), 3);
        assert_eq!(*results[0].as_ref().unwrap(), 1);
        assert!(matches!(&results[1], Err(RescopeError::Resolution { name, .. }) if name == "unknown"));
        assert_eq!(*results[2].as_ref().unwrap(), 2);
    }
}
