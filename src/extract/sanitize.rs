//! Path sanitization for untrusted source map entries.
//!
//! Source maps are fetched from remote servers, so every path they contain has
//! to be treated as hostile: full URLs, absolute paths, `..` traversal chains
//! and whitespace-smuggled tokens all show up in the wild.

use url::Url;

/// Reduce an untrusted path or URL to a safe relative path.
///
/// The result never contains a `..` segment and never starts with `/`, so
/// joining it under any output root cannot escape that root. Worst case is an
/// empty string.
pub fn sanitize_path(raw: &str) -> String {
    let mut candidate = raw;

    // A full URL contributes only its path component. Scheme, host and query
    // are discarded so a hostname can never end up in a filesystem path.
    let url_path;
    if let Ok(url) = Url::parse(raw) {
        if !url.path().is_empty() {
            url_path = url.path().to_string();
            candidate = &url_path;
        }
    }

    // A space is never part of a legitimate bundled path; anything after it is
    // treated as an injected token and dropped.
    if let Some(idx) = candidate.find(' ') {
        candidate = &candidate[..idx];
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in candidate.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                // Pops at most one kept segment; excess `..` runs are dropped
                // instead of walking above the root.
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}
