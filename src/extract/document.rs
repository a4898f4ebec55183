//! Typed view over a raw source map document.

use crate::extract::sanitize_path;
use crate::types::{Result, UnmapError};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Shape of the fields we consume from a source map. Everything is optional at
/// the serde level; validation happens in [`SourceMapDocument::load`] so the
/// error messages can say which field is broken.
#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    file: Option<Value>,
    #[serde(default)]
    sources: Option<Value>,
    #[serde(default, rename = "sourcesContent")]
    sources_content: Option<Value>,
}

/// Parsed source map, reduced to the parts needed for reconstruction.
///
/// `sources` holds sanitized paths already joined under the source root.
/// `sources.len()` and `contents.len()` are allowed to differ; the
/// reconstructor pairs them by index and warns about the mismatch.
#[derive(Debug)]
pub struct SourceMapDocument {
    /// Sanitized `file` field, used to name the combined output file.
    pub output_file: Option<String>,
    pub sources: Vec<PathBuf>,
    pub contents: Vec<String>,
}

impl SourceMapDocument {
    /// Parse raw source map bytes, rooting every source path under `source_root`.
    pub fn load(bytes: &[u8], source_root: &Path) -> Result<Self> {
        let raw: RawDocument = serde_json::from_slice(bytes)
            .map_err(|e| UnmapError::Format(format!("invalid source map document: {}", e)))?;

        let sources = raw
            .sources
            .as_ref()
            .and_then(Value::as_array)
            .ok_or_else(|| {
                UnmapError::Format("sources field is missing or not an array".to_string())
            })?;

        let contents = raw
            .sources_content
            .as_ref()
            .and_then(Value::as_array)
            .ok_or_else(|| {
                UnmapError::Format("sourcesContent field is missing or not an array".to_string())
            })?;

        // Non-string and empty entries are dropped without complaint; the
        // reconstructor falls back to placeholder names for the tail.
        let sources: Vec<PathBuf> = sources
            .iter()
            .filter_map(Value::as_str)
            .map(sanitize_path)
            .filter(|s| !s.is_empty())
            .map(|s| source_root.join(s))
            .collect();

        // Content entries are coerced: anything that is not a string becomes
        // empty content, which the reconstructor then skips with a warning.
        let contents: Vec<String> = contents
            .iter()
            .map(|v| v.as_str().unwrap_or_default().to_string())
            .collect();

        let output_file = raw
            .file
            .as_ref()
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(sanitize_path);

        Ok(Self {
            output_file,
            sources,
            contents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(json: &str) -> Result<SourceMapDocument> {
        SourceMapDocument::load(json.as_bytes(), Path::new("/out/sources"))
    }

    #[test]
    fn test_load_basic_document() {
        let doc = load(
            r#"{
                "version": 3,
                "file": "bundle.js",
                "sources": ["src/a.js", "src/b.js"],
                "sourcesContent": ["aaa", "bbb"],
                "mappings": "AAAA"
            }"#,
        )
        .unwrap();

        assert_eq!(doc.output_file.as_deref(), Some("bundle.js"));
        assert_eq!(doc.sources, vec![
            PathBuf::from("/out/sources/src/a.js"),
            PathBuf::from("/out/sources/src/b.js"),
        ]);
        assert_eq!(doc.contents, vec!["aaa", "bbb"]);
    }

    #[test]
    fn test_invalid_json_is_format_error() {
        let err = load("not json").unwrap_err();
        assert!(matches!(err, UnmapError::Format(_)));
    }

    #[test]
    fn test_missing_sources_is_format_error() {
        let err = load(r#"{"sourcesContent": []}"#).unwrap_err();
        assert!(matches!(err, UnmapError::Format(_)));
    }

    #[test]
    fn test_non_array_sources_is_format_error() {
        let err = load(r#"{"sources": "nope", "sourcesContent": []}"#).unwrap_err();
        assert!(matches!(err, UnmapError::Format(_)));
    }

    #[test]
    fn test_missing_sources_content_is_format_error() {
        let err = load(r#"{"sources": []}"#).unwrap_err();
        assert!(matches!(err, UnmapError::Format(_)));
    }

    #[test]
    fn test_bad_source_entries_skipped() {
        let doc = load(
            r#"{
                "sources": ["good.js", 42, "", null, "also/good.js"],
                "sourcesContent": []
            }"#,
        )
        .unwrap();

        assert_eq!(doc.sources, vec![
            PathBuf::from("/out/sources/good.js"),
            PathBuf::from("/out/sources/also/good.js"),
        ]);
    }

    #[test]
    fn test_non_string_contents_coerced_to_empty() {
        let doc = load(
            r#"{
                "sources": [],
                "sourcesContent": ["code", null, 7, {"k": "v"}]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.contents, vec!["code", "", "", ""]);
    }

    #[test]
    fn test_length_mismatch_preserved() {
        let doc = load(
            r#"{
                "sources": ["a.js", "b.js", "c.js"],
                "sourcesContent": ["1", "2", "3", "4", "5"]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.sources.len(), 3);
        assert_eq!(doc.contents.len(), 5);
    }

    #[test]
    fn test_hostile_source_paths_contained() {
        let doc = load(
            r#"{
                "sources": ["../../../../etc/passwd", "webpack:///src/ok.js"],
                "sourcesContent": []
            }"#,
        )
        .unwrap();

        let root = Path::new("/out/sources");
        for path in &doc.sources {
            assert!(path.starts_with(root), "{:?}", path);
        }
    }

    #[test]
    fn test_file_field_variants() {
        let doc = load(r#"{"file": "", "sources": [], "sourcesContent": []}"#).unwrap();
        assert!(doc.output_file.is_none());

        let doc = load(r#"{"file": 3, "sources": [], "sourcesContent": []}"#).unwrap();
        assert!(doc.output_file.is_none());

        let doc = load(
            r#"{"file": "../apps/main.js", "sources": [], "sourcesContent": []}"#,
        )
        .unwrap();
        assert_eq!(doc.output_file.as_deref(), Some("apps/main.js"));
    }
}
