//! Core error type for the source map unpacker.

use thiserror::Error;

/// Errors that can occur while unpacking source maps or resolving dependencies.
#[derive(Error, Debug)]
pub enum UnmapError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("source map format error: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, UnmapError>;
