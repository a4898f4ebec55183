//! Command line configuration.

use crate::types::Result;
use clap::Parser;
use std::path::PathBuf;

/// Reconstruct original sources from JS/CSS source maps and resolve the npm
/// dependency tree of every node module they reveal.
#[derive(Parser, Debug, Clone)]
#[command(name = "unmap")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Directory to write reconstructed output to
    #[arg(short, long, default_value = "output", env = "UNMAP_OUTPUT")]
    pub output: PathBuf,

    /// Target source map file path
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Target source map URL
    #[arg(long)]
    pub url: Option<String>,

    /// File containing a list of target source map file paths (one per line)
    #[arg(long)]
    pub file_list: Option<PathBuf>,

    /// File containing a list of target source map URLs (one per line)
    #[arg(long)]
    pub url_list: Option<PathBuf>,

    /// Delay between two download requests, in milliseconds
    #[arg(long, default_value = "0")]
    pub delay: u64,

    /// Force re-download and overwrite locally cached source maps
    #[arg(long)]
    pub force: bool,

    /// Only use local files, never perform any network request
    #[arg(long)]
    pub local: bool,

    /// Additionally combine all reconstructed files into one output file
    #[arg(long)]
    pub combined: bool,

    /// Skip npm dependency resolution (only reconstruct files)
    #[arg(long)]
    pub skip_resolve: bool,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Rate limit for registry requests (requests per second)
    #[arg(long, default_value = "10")]
    pub rate_limit: u32,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from("output"),
            file: None,
            url: None,
            file_list: None,
            url_list: None,
            delay: 0,
            force: false,
            local: false,
            combined: false,
            skip_resolve: false,
            timeout: 30,
            rate_limit: 10,
            verbose: false,
        }
    }
}

/// Load a target list file: one entry per line, blank lines and `#` comments
/// ignored.
pub fn load_list(path: &std::path::Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_list_skips_blanks_and_comments() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("targets.txt");
        fs::write(
            &path,
            "https://a.example/app.js.map\n\n# comment\n  https://b.example/main.js  \n",
        )
        .unwrap();

        let list = load_list(&path).unwrap();
        assert_eq!(
            list,
            vec![
                "https://a.example/app.js.map".to_string(),
                "https://b.example/main.js".to_string(),
            ]
        );
    }

    #[test]
    fn test_load_list_missing_file_errors() {
        assert!(load_list(std::path::Path::new("/nonexistent/targets.txt")).is_err());
    }
}
