//! Immutable resource index, grouped by root.
//!
//! The index is built once from an ordered list of roots and never changes
//! afterwards, so it can be shared across threads without locking. Root
//! order is preserved and defines query and service-discovery order.

use crate::config::LocatorConfig;
use crate::source::SourceRoot;
use indexmap::IndexMap;
use indexmap::map::Entry;
use rayon::prelude::*;
use rescope_api::{ResourceDescriptor, RescopeError, Result, RootId, RootInfo, RootLocation};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug)]
struct RootEntries {
    location: RootLocation,
    /// Resources by name, in enumeration order
    resources: IndexMap<String, ResourceDescriptor>,
}

/// Summary of an index build
#[derive(Debug, Default, Clone)]
pub struct IndexStats {
    /// Number of leaf roots in the index
    pub roots: usize,
    /// Total number of descriptors across all roots
    pub resources: usize,
    /// Names contributed by more than one root
    pub shadowed_names: usize,
    /// Root count per location kind, e.g. {"archive": 3, "directory": 1}
    pub by_kind: HashMap<String, usize>,
    /// Time taken to enumerate and assemble
    pub duration: Duration,
}

#[derive(Debug)]
pub struct ResourceIndex {
    roots: IndexMap<RootId, RootEntries>,
    stats: IndexStats,
}

impl ResourceIndex {
    /// Enumerate every leaf root and assemble the index.
    ///
    /// Fails without producing an index if any root fails to enumerate.
    pub fn build(roots: &[SourceRoot], config: &LocatorConfig) -> Result<Self> {
        let start = Instant::now();
        let leaves = unique_leaves(roots);
        if leaves.is_empty() {
            return Err(RescopeError::InvalidState(
                "no source roots to index".to_string(),
            ));
        }

        let follow_links = config.follow_links;
        let enumerate = |root: &SourceRoot| -> Result<Vec<ResourceDescriptor>> {
            let root_start = Instant::now();
            let resources = root.enumerate(follow_links)?;
            debug!(
                "Enumerated {} resources from {:?} in {:?}",
                resources.len(),
                root.location(),
                root_start.elapsed()
            );
            Ok(resources)
        };

        let enumerated: Vec<Vec<ResourceDescriptor>> = if config.parallel_enumeration {
            leaves.par_iter().map(|&root| enumerate(root)).collect::<Result<_>>()?
        } else {
            leaves.iter().map(|&root| enumerate(root)).collect::<Result<_>>()?
        };

        let mut index = IndexMap::with_capacity(enumerated.len());
        let mut stats = IndexStats {
            roots: enumerated.len(),
            ..IndexStats::default()
        };

        for (root, resources) in leaves.into_iter().zip(enumerated) {
            let Some(location) = root.location() else {
                continue;
            };
            *stats.by_kind.entry(location.kind().to_string()).or_default() += 1;

            let mut by_name = IndexMap::with_capacity(resources.len());
            for descriptor in resources {
                match by_name.entry(descriptor.name().to_string()) {
                    Entry::Vacant(slot) => {
                        slot.insert(descriptor);
                    }
                    Entry::Occupied(_) => {
                        debug!(
                            "Duplicate entry {} in {}, keeping the first",
                            descriptor.name(),
                            location
                        );
                    }
                }
            }

            stats.resources += by_name.len();
            index.insert(
                root.id(),
                RootEntries {
                    location,
                    resources: by_name,
                },
            );
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for entries in index.values() {
            for name in entries.resources.keys() {
                *seen.entry(name.as_str()).or_default() += 1;
            }
        }
        stats.shadowed_names = seen.values().filter(|&&count| count > 1).count();

        stats.duration = start.elapsed();
        info!(
            "Resource index built: {} roots, {} resources, {} shadowed names in {:?}",
            stats.roots, stats.resources, stats.shadowed_names, stats.duration
        );

        Ok(Self {
            roots: index,
            stats,
        })
    }

    /// Leaf root ids in search order
    pub fn roots(&self) -> impl Iterator<Item = RootId> + '_ {
        self.roots.keys().copied()
    }

    pub fn root_info(&self, id: RootId) -> Option<RootInfo> {
        self.roots.get(&id).map(|entries| RootInfo {
            id,
            location: entries.location.clone(),
            resource_count: entries.resources.len(),
        })
    }

    /// Resource `name` in one specific root
    pub fn get(&self, root: RootId, name: &str) -> Option<&ResourceDescriptor> {
        self.roots.get(&root)?.resources.get(name)
    }

    /// Resources contributed by one root, in enumeration order
    pub fn resources_of(&self, root: RootId) -> impl Iterator<Item = &ResourceDescriptor> + '_ {
        self.roots
            .get(&root)
            .into_iter()
            .flat_map(|entries| entries.resources.values())
    }

    /// Every descriptor, by root order then enumeration order
    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> + '_ {
        self.roots
            .values()
            .flat_map(|entries| entries.resources.values())
    }

    /// Every descriptor named exactly `name`, one per contributing root
    pub fn lookup<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ResourceDescriptor> + 'a {
        self.roots
            .values()
            .filter_map(move |entries| entries.resources.get(name))
    }

    pub fn len(&self) -> usize {
        self.stats.resources
    }

    pub fn is_empty(&self) -> bool {
        self.stats.resources == 0
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }
}

/// Flatten aggregates and drop roots already seen by id or by location
fn unique_leaves(roots: &[SourceRoot]) -> Vec<&SourceRoot> {
    let mut ids = HashSet::new();
    let mut locations = HashSet::new();
    let mut leaves = Vec::new();

    for leaf in roots.iter().flat_map(SourceRoot::leaves) {
        if !ids.insert(leaf.id()) {
            debug!("Skipping root {} registered twice", leaf.id());
            continue;
        }
        if let Some(key) = leaf.dedup_key() {
            if !locations.insert(key.clone()) {
                debug!("Skipping duplicate location {}", key.display());
                continue;
            }
        }
        leaves.push(leaf);
    }

    leaves
}
