//! unmap - source map unpacker and npm dependency tree resolver.
//!
//! CLI entry point.

use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;
use unmap::{Application, Config};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Set up logging
    let filter = if config.verbose {
        EnvFilter::new("unmap=debug,info")
    } else {
        EnvFilter::new("unmap=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut app = Application::new(config);
    if let Err(e) = app.run().await {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
