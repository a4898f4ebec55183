//! Reconstructs original source files from a parsed source map.

use crate::extract::{extract_module_name, SourceMapDocument};
use crate::types::Result;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Default name for the combined output when the map has no `file` field.
const DEFAULT_COMBINED_NAME: &str = "combined.js";

/// Default extension appended to reconstructed paths that have none.
const DEFAULT_EXTENSION: &str = "js";

/// Materializes the files described by a source map under an output root.
///
/// Writes are idempotent: a file is only appended to when it does not already
/// contain the new content as a substring, so re-running extraction against
/// the same or overlapping maps converges instead of duplicating content. The
/// re-read per write costs O(file size); correctness is worth more here than
/// throughput.
pub struct SourceReconstructor {
    root: PathBuf,
    combined: bool,
}

impl SourceReconstructor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            combined: false,
        }
    }

    /// Also append every reconstructed file to one combined output file.
    pub fn with_combined(mut self, combined: bool) -> Self {
        self.combined = combined;
        self
    }

    fn source_root(&self) -> PathBuf {
        self.root.join("sources")
    }

    /// Extract all files from the source map at `map_path`.
    ///
    /// Returns the package identifiers discovered in reconstructed paths.
    pub fn extract(&self, map_path: &Path) -> Result<Vec<String>> {
        info!("Extracting: {}", map_path.display());
        let bytes = fs::read(map_path)?;
        let document = SourceMapDocument::load(&bytes, &self.source_root())?;
        self.reconstruct(&document)
    }

    /// Materialize one parsed document on disk.
    pub fn reconstruct(&self, document: &SourceMapDocument) -> Result<Vec<String>> {
        fs::create_dir_all(self.root.join("combined"))?;
        fs::create_dir_all(self.source_root())?;

        let mut combined_out = if self.combined {
            Some(self.open_combined(document)?)
        } else {
            None
        };

        let source_count = document.sources.len();
        let content_count = document.contents.len();

        info!("Discovered sources: {}", source_count);
        info!("Discovered contents: {}", content_count);

        if source_count > content_count {
            warn!("There are more sources than contents, filenames may not match content");
        } else if source_count < content_count {
            warn!("There are more contents than sources, filenames may not match content");
        }

        let mut modules = Vec::new();
        for (i, content) in document.contents.iter().enumerate() {
            let mut target = document.sources.get(i).cloned().unwrap_or_else(|| {
                self.source_root().join(format!("undefined-{}.js", i))
            });

            if content.is_empty() {
                warn!("Skipping {} - no content", target.display());
                continue;
            }

            if target.extension().is_none() {
                target.set_extension(DEFAULT_EXTENSION);
            }

            if let Some(module) = extract_module_name(&target.to_string_lossy()) {
                info!(
                    "Node module discovered: {} ({})",
                    module.package, module.reference
                );
                modules.push(module.package);
            }

            // Parent creation is only safe because every path was sanitized
            // into the source root; a failure here skips this file only.
            if let Some(parent) = target.parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    error!("Failed to create directory {}: {}", parent.display(), e);
                    continue;
                }
            }

            if let Err(e) = self.write_source(&target, content, combined_out.as_mut()) {
                error!("Failed to write {}: {}", target.display(), e);
            }
        }

        Ok(modules)
    }

    fn open_combined(&self, document: &SourceMapDocument) -> Result<File> {
        let name = document
            .output_file
            .as_deref()
            .unwrap_or(DEFAULT_COMBINED_NAME);
        let target = self.root.join("combined").join(name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(OpenOptions::new().append(true).create(true).open(target)?)
    }

    /// Append `content` to `path` unless the file already contains it.
    ///
    /// The combined stream follows the same check: a banner block is only
    /// appended when the per-file store accepts the content, so re-runs leave
    /// both untouched.
    fn write_source(
        &self,
        path: &Path,
        content: &str,
        combined: Option<&mut File>,
    ) -> Result<()> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        let mut existing = String::new();
        file.read_to_string(&mut existing)?;

        if existing.contains(content) {
            debug!("Skipping {} - content already known", path.display());
            return Ok(());
        }

        if let Some(out) = combined {
            let banner = format!("\n/**\nRestored: {}\n**/\n\n{}\n\n", path.display(), content);
            out.write_all(banner.as_bytes())?;
        }

        file.write_all(content.as_bytes())?;
        info!("Wrote to: {}", path.display());
        Ok(())
    }
}
