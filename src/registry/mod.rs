//! Registry lookups, memoization and dependency graph resolution.

pub mod cache;
pub mod npm;
pub mod resolver;

pub use cache::DependencyCache;
pub use npm::{NpmRegistry, PackageMetadata, RegistryClient};
pub use resolver::DependencyResolver;
