//! npm registry client and package metadata types.

use crate::types::{Result, UnmapError};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Registry metadata document for one package.
///
/// The registry payload is large; only the fields the resolver consumes are
/// modeled, everything defaulted so partial documents still deserialize.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: DistTags,
    #[serde(default)]
    pub versions: HashMap<String, VersionRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistTags {
    #[serde(default)]
    pub latest: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionRecord {
    #[serde(default)]
    pub version: String,
    /// Dependency name -> version-range string.
    #[serde(default)]
    pub dependencies: HashMap<String, String>,
}

impl PackageMetadata {
    /// Dependency names of the version `dist-tags.latest` points at.
    ///
    /// Empty when the tag is missing or references an unknown version.
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.dist_tags
            .latest
            .as_deref()
            .and_then(|tag| self.versions.get(tag))
            .into_iter()
            .flat_map(|record| record.dependencies.keys())
            .map(String::as_str)
    }
}

/// Boundary to the package registry. The resolver owns caching; an
/// implementation only has to fetch and deserialize one metadata document.
#[allow(async_fn_in_trait)]
pub trait RegistryClient {
    async fn fetch(&self, name: &str) -> Result<PackageMetadata>;
}

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// HTTP client for the public npm registry.
pub struct NpmRegistry {
    client: Client,
    rate_limiter: Arc<DirectRateLimiter>,
    registry_url: String,
}

impl NpmRegistry {
    /// Create a registry client with a request timeout and rate limit.
    pub fn new(timeout_secs: u64, rate_limit: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("unmap/0.1")
            .http1_only() // Force HTTP/1.1 to avoid HTTP/2 stream limit issues
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        let quota =
            Quota::per_second(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::new(5).unwrap()));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            client,
            rate_limiter,
            registry_url: "https://registry.npmjs.org".to_string(),
        })
    }
}

impl RegistryClient for NpmRegistry {
    async fn fetch(&self, name: &str) -> Result<PackageMetadata> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/{}", self.registry_url, urlencoding::encode(name));
        trace!("Fetching registry metadata: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(UnmapError::Registry(format!(
                "{}: HTTP {}",
                name,
                response.status()
            )));
        }

        let metadata = response
            .json::<PackageMetadata>()
            .await
            .map_err(|e| UnmapError::Registry(format!("{}: malformed metadata: {}", name, e)))?;

        Ok(metadata)
    }
}
