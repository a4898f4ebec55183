//! Source map download with a local file cache.

use crate::types::{Result, UnmapError};
use reqwest::Client;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Downloads source map files, skipping anything already cached on disk.
///
/// On any failure the target file is removed, so a target path either holds a
/// complete, server-validated body or does not exist.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    force: bool,
    local_only: bool,
    delay: Duration,
}

impl Downloader {
    pub fn new(timeout_secs: u64, force: bool, local_only: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("unmap/0.1")
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            force,
            local_only,
            delay: Duration::ZERO,
        })
    }

    /// Sleep this long after every request, to pace batch downloads.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Download `source` to `target`, honoring the cache and local-only mode.
    pub async fn download(&self, source: &str, target: &Path) -> Result<()> {
        if target.exists() && !self.force {
            info!("Local cache: {}", source);
            return Ok(());
        }
        if self.local_only {
            return Err(UnmapError::Download(format!(
                "{}: local only mode is active",
                source
            )));
        }

        info!("Downloading: {}", source);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let result = self.fetch_body(source).await;

        if self.delay > Duration::ZERO {
            tokio::time::sleep(self.delay).await;
        }

        // Body is fully buffered before the target is written; a write
        // failure still removes the partial file.
        let body = result?;
        if let Err(e) = fs::write(target, &body) {
            let _ = fs::remove_file(target);
            return Err(e.into());
        }

        Ok(())
    }

    async fn fetch_body(&self, source: &str) -> Result<Vec<u8>> {
        let response = self.client.get(source).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UnmapError::Download(format!("{}: HTTP {}", source, status)));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
