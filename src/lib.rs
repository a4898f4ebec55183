//! unmap - source map unpacker and npm dependency tree resolver.
//!
//! This library provides tools for:
//! - Reconstructing original source trees from JS/CSS source map documents,
//!   with sanitization of the untrusted paths they embed
//! - Detecting node module references in the reconstructed paths
//! - Resolving the transitive npm dependency closure of every discovered
//!   module, with memoized registry lookups
//!
//! # Example
//!
//! ```no_run
//! use unmap::app::Application;
//! use unmap::config::Config;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut app = Application::new(Config::default());
//!     app.run().await.unwrap();
//! }
//! ```

pub mod app;
pub mod config;
pub mod console;
pub mod download;
pub mod extract;
pub mod registry;
pub mod types;

pub use app::Application;
pub use config::Config;
pub use extract::{
    extract_module_name, sanitize_path, ModuleReference, SourceMapDocument, SourceReconstructor,
};
pub use registry::{DependencyCache, DependencyResolver, NpmRegistry, PackageMetadata, RegistryClient};
pub use types::{Result, UnmapError};
