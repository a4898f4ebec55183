//! Colored console output for run statistics and results.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Console presentation helper. Diagnostics go through `tracing`; this type
/// only renders the result-style lines a user reads at a glance.
pub struct ConsoleOutput {
    verbose: bool,
}

impl ConsoleOutput {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Print a labeled statistic line.
    pub fn print_statistic(&self, label: &str, count: usize) {
        println!(
            "{} {}: {}",
            "[+]".bright_cyan(),
            label,
            count.to_string().bright_white().bold()
        );
    }

    /// Print progress detail (verbose mode only).
    pub fn print_progress(&self, message: &str) {
        if !self.verbose {
            return;
        }
        println!("{} {}", "[.]".dimmed(), message.dimmed());
    }

    /// Print the end-of-run summary.
    pub fn print_summary(
        &self,
        sources: usize,
        modules: usize,
        dependencies: usize,
        duration_secs: f64,
    ) {
        println!();
        println!("{}", "=== Run Summary ===".bright_cyan());
        println!("  Source maps:   {}", sources);
        println!("  Node modules:  {}", modules);
        println!("  Dependencies:  {}", dependencies);
        println!("  Duration:      {:.2}s", duration_secs);
        println!();
    }

    /// Create a progress bar for a batch of known size.
    pub fn create_progress_bar(&self, total: u64, message: &str) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_message(message.to_string());
        pb
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_output_creation() {
        let console = ConsoleOutput::new(true);
        assert!(console.verbose);
    }

    #[test]
    fn test_progress_bar_length() {
        let console = ConsoleOutput::default();
        let pb = console.create_progress_bar(7, "resolving");
        assert_eq!(pb.length(), Some(7));
    }
}
