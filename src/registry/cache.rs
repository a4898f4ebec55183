//! Process-lifetime memoization of registry lookups.

use crate::registry::npm::PackageMetadata;
use crate::types::UnmapError;
use dashmap::DashMap;
use std::sync::Arc;

/// Outcome of one registry lookup. Failures are cached like successes so a
/// broken package is never fetched twice.
pub type CachedLookup = Result<Arc<PackageMetadata>, Arc<UnmapError>>;

/// Write-once cache keyed by package identifier.
///
/// Owned by the resolver rather than living in a process global, so tests get
/// isolated instances. The first writer for a key wins; later inserts return
/// the already-stored value.
#[derive(Debug, Default)]
pub struct DependencyCache {
    entries: DashMap<String, CachedLookup>,
}

impl DependencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, package_name: &str) -> Option<CachedLookup> {
        self.entries
            .get(package_name)
            .map(|entry| entry.value().clone())
    }

    /// Store a lookup result, keeping any value already present.
    pub fn insert(&self, package_name: &str, lookup: CachedLookup) -> CachedLookup {
        self.entries
            .entry(package_name.to_string())
            .or_insert(lookup)
            .value()
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
