//! Query surface over a built [`ResourceIndex`].
//!
//! Every query returns a fresh lazy iterator over immutable data, ordered by
//! root insertion order and then by enumeration order within a root. The
//! locator holds no interior state besides the compiled-pattern memo, so it
//! can be shared freely across threads.

pub mod builder;
pub mod query;
pub mod services;

pub use builder::LocatorBuilder;
pub use query::NameQuery;
pub use services::{ServiceRegistry, UnknownProvider};

use crate::cache::CachedResource;
use crate::config::LocatorConfig;
use crate::glob::{Glob, GlobCache};
use crate::index::{IndexStats, ResourceIndex};
use rescope_api::{ResourceDescriptor, ResourceLoader, Result, RootId, RootInfo};
use std::sync::Arc;

#[derive(Debug)]
pub struct ResourceLocator {
    index: ResourceIndex,
    config: LocatorConfig,
    globs: GlobCache,
}

impl ResourceLocator {
    pub fn builder() -> LocatorBuilder {
        LocatorBuilder::new()
    }

    pub(crate) fn new(index: ResourceIndex, config: LocatorConfig) -> Self {
        Self {
            index,
            config,
            globs: GlobCache::new(),
        }
    }

    /// Every resource named exactly `name`, one per contributing root
    pub fn locate<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ResourceDescriptor> + 'a {
        self.index.lookup(name)
    }

    /// Every resource whose name satisfies `pred`
    pub fn locate_where<'a, P>(&'a self, pred: P) -> impl Iterator<Item = &'a ResourceDescriptor> + 'a
    where
        P: Fn(&str) -> bool + 'a,
    {
        self.index.iter().filter(move |d| pred(d.name()))
    }

    /// Every resource whose name matches the glob `pattern`.
    ///
    /// A malformed pattern fails here, before any iteration.
    pub fn locate_matching(
        &self,
        pattern: &str,
    ) -> Result<impl Iterator<Item = &ResourceDescriptor> + '_> {
        let glob = self.compile(pattern)?;
        Ok(self.index.iter().filter(move |d| glob.matches(d.name())))
    }

    pub fn find<'a>(
        &'a self,
        query: &'a NameQuery,
    ) -> Box<dyn Iterator<Item = &'a ResourceDescriptor> + 'a> {
        match query {
            NameQuery::Exact(name) => Box::new(self.index.lookup(name)),
            _ => Box::new(self.index.iter().filter(move |d| query.matches(d.name()))),
        }
    }

    /// First match in search order
    pub fn first<'a>(&'a self, query: &'a NameQuery) -> Option<&'a ResourceDescriptor> {
        self.find(query).next()
    }

    /// Decode every match with `loader` as the iterator is consumed.
    ///
    /// A failing element yields its own `Err` and does not stop the
    /// iteration.
    pub fn load<'a, T, L>(
        &'a self,
        query: &'a NameQuery,
        loader: &'a L,
    ) -> impl Iterator<Item = Result<T>> + 'a
    where
        T: 'a,
        L: ResourceLoader<T> + ?Sized,
    {
        self.find(query).map(move |d| {
            loader
                .load(d.content().as_ref())
                .map_err(|e| e.for_resource(d.name()))
        })
    }

    /// Wrap every match in a [`CachedResource`]; nothing is decoded yet
    pub fn cached<'a, T: 'a>(
        &'a self,
        query: &'a NameQuery,
        loader: Arc<dyn ResourceLoader<T>>,
    ) -> impl Iterator<Item = CachedResource<T>> + 'a {
        let retention = self.config.retention;
        self.find(query)
            .map(move |d| CachedResource::new(d, loader.clone(), retention))
    }

    /// Every resource in search order
    pub fn resources(&self) -> impl Iterator<Item = &ResourceDescriptor> + '_ {
        self.index.iter()
    }

    /// Leaf root ids in search order
    pub fn roots(&self) -> impl Iterator<Item = RootId> + '_ {
        self.index.roots()
    }

    pub fn root_info(&self, id: RootId) -> Option<RootInfo> {
        self.index.root_info(id)
    }

    pub fn stats(&self) -> &IndexStats {
        self.index.stats()
    }

    pub fn index(&self) -> &ResourceIndex {
        &self.index
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    fn compile(&self, pattern: &str) -> Result<Arc<Glob>> {
        if self.config.pattern_cache {
            self.globs.get_or_compile(pattern)
        } else {
            Ok(Arc::new(Glob::new(pattern)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::TextLoader;
    use crate::source::SourceRoot;
    use rescope_api::{ContentHandle, LoadError, RescopeError};

    fn locator(roots: Vec<SourceRoot>) -> ResourceLocator {
        roots
            .into_iter()
            .fold(ResourceLocator::builder(), LocatorBuilder::add_root)
            .build()
            .unwrap()
    }

    fn names<'a>(it: impl Iterator<Item = &'a ResourceDescriptor>) -> Vec<&'a str> {
        it.map(|d| d.name()).collect()
    }

    #[test]
    fn test_shadowed_names_follow_root_order() {
        let r1 = SourceRoot::in_memory("r1", [("x", b"1".to_vec())]);
        let r2 = SourceRoot::in_memory("r2", [("x", b"2".to_vec())]);
        let (id1, id2) = (r1.id(), r2.id());
        let locator = locator(vec![r1, r2]);

        let origins: Vec<RootId> = locator.locate("x").map(|d| d.origin()).collect();
        assert_eq!(origins, vec![id1, id2]);
        assert_eq!(locator.first(&NameQuery::exact("x")).unwrap().origin(), id1);
        assert_eq!(locator.locate("y").count(), 0);
    }

    #[test]
    fn test_glob_and_predicate_queries() {
        let locator = locator(vec![SourceRoot::in_memory(
            "m",
            [
                ("com/example/Main.java", b"".to_vec()),
                ("com/example/Main.class", b"".to_vec()),
                ("com/example/util/Strings.java", b"".to_vec()),
                ("README.md", b"".to_vec()),
            ],
        )]);

        assert_eq!(
            names(locator.locate_matching("**/*.java").unwrap()),
            vec!["com/example/Main.java", "com/example/util/Strings.java"]
        );
        assert_eq!(
            names(locator.locate_matching("com/example/*.{java,class}").unwrap()),
            vec!["com/example/Main.java", "com/example/Main.class"]
        );
        assert_eq!(
            names(locator.locate_where(|n| !n.contains('/'))),
            vec!["README.md"]
        );
        assert!(matches!(
            locator.locate_matching("{java"),
            Err(RescopeError::PatternSyntax { .. })
        ));
    }

    #[test]
    fn test_find_with_every_query_form() {
        let locator = locator(vec![SourceRoot::in_memory(
            "m",
            [("a.txt", b"".to_vec()), ("b.txt", b"".to_vec())],
        )]);

        assert_eq!(names(locator.find(&NameQuery::exact("b.txt"))), vec!["b.txt"]);
        assert_eq!(
            names(locator.find(&NameQuery::glob("*.txt").unwrap())),
            vec!["a.txt", "b.txt"]
        );
        assert_eq!(
            names(locator.find(&NameQuery::predicate(|n| n.starts_with('a')))),
            vec!["a.txt"]
        );
    }

    #[test]
    fn test_load_reports_failures_per_element() {
        let locator = locator(vec![SourceRoot::in_memory(
            "m",
            [
                ("t/1.txt", b"one".to_vec()),
                ("t/2.txt", vec![0xFF]),
                ("t/3.txt", b"three".to_vec()),
            ],
        )]);

        let query = NameQuery::glob("t/*.txt").unwrap();
        let results: Vec<Result<String>> = locator.load(&query, &TextLoader).collect();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), "one");
        assert!(matches!(&results[1], Err(RescopeError::Decode { name, .. }) if name == "t/2.txt"));
        assert_eq!(results[2].as_ref().unwrap(), "three");
    }

    #[test]
    fn test_load_accepts_closures() {
        let locator = locator(vec![SourceRoot::in_memory("m", [("n", b"12345".to_vec())])]);
        let len = |content: &dyn ContentHandle| -> std::result::Result<usize, LoadError> {
            Ok(content.read_all()?.len())
        };
        let lens: Vec<usize> = locator
            .load(&NameQuery::exact("n"), &len)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(lens, vec![5]);
    }

    #[test]
    fn test_cached_uses_configured_retention() {
        let root = SourceRoot::in_memory("m", [("a", b"A".to_vec())]);
        let locator = ResourceLocator::builder().add_root(root).build().unwrap();

        let loader: Arc<dyn ResourceLoader<String>> = Arc::new(TextLoader);
        let cached: Vec<CachedResource<String>> =
            locator.cached(&NameQuery::exact("a"), loader).collect();
        assert_eq!(cached.len(), 1);
        assert!(!cached[0].is_loaded());
        assert_eq!(*cached[0].get().unwrap(), "A");
    }

    #[test]
    fn test_pattern_cache_is_memoized() {
        let locator = locator(vec![SourceRoot::in_memory("m", [("a", b"".to_vec())])]);
        locator.locate_matching("*").unwrap().count();
        locator.locate_matching("*").unwrap().count();
        assert_eq!(locator.globs.len(), 1);
    }

    #[test]
    fn test_locator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResourceLocator>();
        assert_send_sync::<CachedResource<String>>();
    }
}
