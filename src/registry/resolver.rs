//! Transitive dependency resolution over the registry graph.

use crate::registry::cache::{CachedLookup, DependencyCache};
use crate::registry::npm::RegistryClient;
use crate::types::{Result, UnmapError};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{trace, warn};

/// Walks the registry dependency graph to a flat, deduplicated set of names.
///
/// Every fetch goes through an owned [`DependencyCache`], so a package is
/// fetched at most once per resolver instance no matter how many paths in the
/// graph reach it.
pub struct DependencyResolver<C> {
    client: C,
    cache: DependencyCache,
}

impl<C: RegistryClient> DependencyResolver<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            cache: DependencyCache::new(),
        }
    }

    /// Resolve `name` and its transitive dependencies into `seen`.
    ///
    /// A root lookup failure propagates without touching `seen`. A failed
    /// non-root node is recorded in `seen` unexpanded (its dependencies are
    /// unknown, not empty) and its siblings keep resolving. Names already in
    /// `seen` are never revisited, which also breaks dependency cycles.
    pub async fn resolve(&self, name: &str, seen: &mut BTreeSet<String>) -> Result<()> {
        let root = self
            .metadata(name)
            .await
            .map_err(|e| UnmapError::Registry(e.to_string()))?;
        seen.insert(canonical_name(&root.name, name));

        let mut pending: Vec<String> = root
            .dependencies()
            .filter(|dep| !seen.contains(*dep))
            .map(str::to_string)
            .collect();

        while let Some(package) = pending.pop() {
            if seen.contains(&package) {
                continue;
            }

            match self.metadata(&package).await {
                Ok(meta) => {
                    seen.insert(canonical_name(&meta.name, &package));
                    for dep in meta.dependencies() {
                        if !seen.contains(dep) {
                            pending.push(dep.to_string());
                        }
                    }
                }
                Err(e) => {
                    // Listed but left unexpanded; the rest of the graph is
                    // still worth resolving.
                    warn!("Could not expand {}: {}", package, e);
                    seen.insert(package);
                }
            }
        }

        Ok(())
    }

    /// Cache-memoized metadata lookup.
    async fn metadata(&self, name: &str) -> CachedLookup {
        if let Some(hit) = self.cache.get(name) {
            trace!("Cache hit for {}", name);
            return hit;
        }

        let lookup = match self.client.fetch(name).await {
            Ok(meta) => Ok(Arc::new(meta)),
            Err(e) => Err(Arc::new(e)),
        };

        self.cache.insert(name, lookup)
    }

    /// Number of distinct packages looked up so far.
    pub fn cached_lookups(&self) -> usize {
        self.cache.len()
    }
}

fn canonical_name(registry_name: &str, queried: &str) -> String {
    if registry_name.is_empty() {
        queried.to_string()
    } else {
        registry_name.to_string()
    }
}
