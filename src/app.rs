//! Application orchestration: source gathering, extraction and resolution.

use crate::config::{load_list, Config};
use crate::console::ConsoleOutput;
use crate::download::Downloader;
use crate::extract::{sanitize_path, SourceReconstructor};
use crate::registry::{DependencyResolver, NpmRegistry, RegistryClient};
use crate::types::{Result, UnmapError};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use url::Url;

/// Artifact listing the node modules discovered in reconstructed paths.
const MODULES_ARTIFACT: &str = "node_modules.txt";

/// Artifact listing the full transitive dependency set.
const DEPENDENCIES_ARTIFACT: &str = "dependencies.txt";

/// Ties the whole run together: gathers source maps (local files, downloads,
/// stdin), reconstructs their file trees and resolves the npm dependency
/// closure of every discovered module.
pub struct Application {
    config: Config,
    console: ConsoleOutput,
    sources: Vec<PathBuf>,
}

impl Application {
    pub fn new(config: Config) -> Self {
        let console = ConsoleOutput::new(config.verbose);
        Self {
            config,
            console,
            sources: Vec::new(),
        }
    }

    /// Run the full pipeline. Only output-root creation failure or an empty
    /// target list abort the run; everything else degrades per source map,
    /// per file or per dependency branch.
    pub async fn run(&mut self) -> Result<()> {
        let start = Instant::now();

        self.verify().await?;
        self.console
            .print_statistic("Verified sources", self.sources.len());

        let mut discovered: Vec<String> = Vec::new();
        for source in &self.sources {
            let reconstructor = SourceReconstructor::new(&self.config.output)
                .with_combined(self.config.combined);
            match reconstructor.extract(source) {
                Ok(modules) => discovered.extend(modules),
                Err(e) => error!("Extraction failed for {}: {}", source.display(), e),
            }
        }

        let core_modules: BTreeSet<String> = discovered.into_iter().collect();
        self.console
            .print_statistic("Discovered node modules", core_modules.len());
        write_name_list(&self.config.output.join(MODULES_ARTIFACT), &core_modules)?;

        let mut dependency_count = 0;
        if !self.config.skip_resolve {
            self.console
                .print_progress("Resolving packages against the npm registry...");
            let registry = NpmRegistry::new(self.config.timeout, self.config.rate_limit)?;
            let resolver = DependencyResolver::new(registry);
            let dependencies = self.resolve_dependencies(&resolver, &core_modules).await;

            dependency_count = dependencies.len();
            self.console
                .print_statistic("Discovered node dependencies", dependency_count);
            write_name_list(
                &self.config.output.join(DEPENDENCIES_ARTIFACT),
                &dependencies,
            )?;
        }

        self.console.print_summary(
            self.sources.len(),
            core_modules.len(),
            dependency_count,
            start.elapsed().as_secs_f64(),
        );
        Ok(())
    }

    /// Prepare the output root and assemble the deduplicated source list.
    async fn verify(&mut self) -> Result<()> {
        // create_dir_all is idempotent for directories and fails when any
        // component exists as a non-directory.
        fs::create_dir_all(&self.config.output)?;

        let downloader =
            Downloader::new(self.config.timeout, self.config.force, self.config.local)?;
        // The delay paces batch downloads (--url-list and stdin); the single
        // --url fetch is never delayed.
        let paced = downloader
            .clone()
            .with_delay(Duration::from_millis(self.config.delay));

        if let Some(list_path) = self.config.url_list.clone() {
            let list = load_list(&list_path)?;
            self.download_list(&paced, &list).await;
        }
        if let Some(list_path) = self.config.file_list.clone() {
            let list = load_list(&list_path)?;
            self.load_local_list(list.into_iter().map(PathBuf::from));
        }
        if let Some(source_url) = self.config.url.clone() {
            self.download_list(&downloader, std::slice::from_ref(&source_url))
                .await;
        }

        if let Some(source_file) = self.config.file.clone() {
            self.load_local_list(std::iter::once(source_file));
        } else if self.sources.is_empty() {
            self.read_stdin_targets(&paced).await?;
        }

        if self.sources.is_empty() {
            return Err(UnmapError::Config(
                "no target specified. use --file, --url or stdin and provide at least one target"
                    .to_string(),
            ));
        }

        let mut seen: HashSet<PathBuf> = HashSet::new();
        self.sources.retain(|path| seen.insert(path.clone()));
        Ok(())
    }

    /// Download every source map URL in `list` into the sourcemaps cache.
    async fn download_list(&mut self, downloader: &Downloader, list: &[String]) {
        let progress = (list.len() > 1)
            .then(|| self.console.create_progress_bar(list.len() as u64, "Downloading"));

        for raw in list {
            if raw.is_empty() {
                continue;
            }
            let mut target_url = match Url::parse(raw) {
                Ok(u) => u,
                Err(e) => {
                    error!("Invalid URL {}: {}", raw, e);
                    continue;
                }
            };

            let path = target_url.path().to_string();
            if path.ends_with(".js") || path.ends_with(".css") {
                target_url.set_path(&format!("{}.map", path));
            }
            if !target_url.path().ends_with(".map") {
                continue;
            }

            let basename = target_url
                .path()
                .rsplit('/')
                .next()
                .map(sanitize_path)
                .unwrap_or_default();
            if basename.is_empty() {
                continue;
            }

            let filename = self.config.output.join("sourcemaps").join(basename);
            match downloader.download(target_url.as_str(), &filename).await {
                Ok(()) => self.sources.push(filename),
                Err(e) => error!("{}", e),
            }

            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
    }

    /// Keep the local source map paths that actually exist.
    fn load_local_list(&mut self, list: impl Iterator<Item = PathBuf>) {
        for path in list {
            if !path.exists() {
                error!("No such file: {}", path.display());
                continue;
            }
            self.sources.push(path);
        }
    }

    /// Fallback target source: one URL or file path per stdin line.
    async fn read_stdin_targets(&mut self, downloader: &Downloader) -> Result<()> {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            let target = line.trim();
            if target.is_empty() {
                continue;
            }
            if Url::parse(target).is_ok() {
                let entry = target.to_string();
                self.download_list(downloader, std::slice::from_ref(&entry))
                    .await;
            } else {
                self.load_local_list(std::iter::once(PathBuf::from(target)));
            }
        }
        Ok(())
    }

    /// Fixed-point resolution driver.
    ///
    /// A pass resolves every top-level module against the accumulated set;
    /// packages discovered in one pass can pull in further transitive
    /// dependencies, so passes repeat until one adds nothing. Memoized
    /// lookups make the extra passes network-free.
    async fn resolve_dependencies<C: RegistryClient>(
        &self,
        resolver: &DependencyResolver<C>,
        core_modules: &BTreeSet<String>,
    ) -> BTreeSet<String> {
        let mut dependencies: BTreeSet<String> = core_modules.clone();

        loop {
            let before = dependencies.len();
            let progress = self
                .console
                .create_progress_bar(core_modules.len() as u64, "Resolving npm dependencies");

            for name in core_modules {
                info!("Analyzing {}", name);
                let known = dependencies.len();
                if let Err(e) = resolver.resolve(name, &mut dependencies).await {
                    warn!("Failed to resolve {}: {}", name, e);
                }
                let delta = dependencies.len() - known;
                if delta > 0 {
                    info!("{} new dependencies discovered", delta);
                }
                progress.inc(1);
            }
            progress.finish_and_clear();

            if dependencies.len() == before {
                break;
            }
        }

        dependencies
    }
}

/// Persist a sorted name list, one identifier per line, replacing any
/// previous artifact.
fn write_name_list(path: &Path, names: &BTreeSet<String>) -> Result<()> {
    let mut body = String::new();
    for name in names {
        body.push_str(name);
        body.push('\n');
    }
    fs::write(path, body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn base_config(dir: &TempDir) -> Config {
        Config {
            output: dir.path().join("out"),
            skip_resolve: true,
            local: true,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_run_with_local_source_map() {
        let dir = TempDir::new().unwrap();
        let map_path = dir.path().join("bundle.js.map");
        fs::write(
            &map_path,
            r#"{
                "sources": [
                    "node_modules/zebra-pkg/lib/index.js",
                    "node_modules/alpha-pkg/lib/index.js",
                    "src/app.js"
                ],
                "sourcesContent": ["z", "a", "app"]
            }"#,
        )
        .unwrap();

        let mut config = base_config(&dir);
        config.file = Some(map_path);

        let mut app = Application::new(config);
        app.run().await.unwrap();

        // Artifact is sorted ascending, one identifier per line.
        let artifact = dir.path().join("out").join(MODULES_ARTIFACT);
        assert_eq!(
            fs::read_to_string(artifact).unwrap(),
            "alpha-pkg\nzebra-pkg\n"
        );
        assert!(dir
            .path()
            .join("out/sources/node_modules/alpha-pkg/lib/index.js")
            .exists());
    }

    #[tokio::test]
    async fn test_broken_map_does_not_abort_run() {
        let dir = TempDir::new().unwrap();
        let broken = dir.path().join("broken.js.map");
        let good = dir.path().join("good.js.map");
        fs::write(&broken, "not json at all").unwrap();
        fs::write(
            &good,
            r#"{"sources": ["ok.js"], "sourcesContent": ["fine"]}"#,
        )
        .unwrap();

        let mut config = base_config(&dir);
        config.file_list = Some(dir.path().join("list.txt"));
        fs::write(
            dir.path().join("list.txt"),
            format!("{}\n{}\n", broken.display(), good.display()),
        )
        .unwrap();

        let mut app = Application::new(config);
        app.run().await.unwrap();

        assert!(dir.path().join("out/sources/ok.js").exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let mut config = base_config(&dir);
        config.file = Some(dir.path().join("does-not-exist.map"));

        let mut app = Application::new(config);
        let err = app.run().await.unwrap_err();
        assert!(matches!(err, UnmapError::Config(_)));
    }

    #[tokio::test]
    async fn test_duplicate_sources_deduplicated() {
        let dir = TempDir::new().unwrap();
        let map_path = dir.path().join("bundle.js.map");
        fs::write(
            &map_path,
            r#"{"sources": ["a.js"], "sourcesContent": ["x"]}"#,
        )
        .unwrap();

        let mut config = base_config(&dir);
        config.file = Some(map_path.clone());
        config.file_list = Some(dir.path().join("list.txt"));
        fs::write(
            dir.path().join("list.txt"),
            format!("{}\n{}\n", map_path.display(), map_path.display()),
        )
        .unwrap();

        let mut app = Application::new(config);
        app.run().await.unwrap();

        assert_eq!(app.sources.len(), 1);
    }

    #[test]
    fn test_write_name_list_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("deps.txt");

        let first: BTreeSet<String> =
            ["b".to_string(), "a".to_string()].into_iter().collect();
        write_name_list(&path, &first).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\n");

        let second: BTreeSet<String> = ["only".to_string()].into_iter().collect();
        write_name_list(&path, &second).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "only\n");
    }
}
