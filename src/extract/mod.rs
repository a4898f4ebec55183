//! Source map extraction: path sanitization, document parsing and file
//! reconstruction.

pub mod document;
pub mod reconstructor;
pub mod sanitize;

pub use document::SourceMapDocument;
pub use reconstructor::SourceReconstructor;
pub use sanitize::sanitize_path;

/// A package reference discovered in a reconstructed file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleReference {
    /// Package identifier, e.g. `lodash` or `@scope/name`.
    pub package: String,
    /// Path remainder inside the package, kept for reporting.
    pub reference: String,
}

/// Marker segment denoting the root of third-party dependency code.
const MODULE_ROOT_MARKER: &str = "node_modules/";

/// Extract a package identifier from a reconstructed file path.
///
/// The remainder after the `node_modules/` marker must split into three
/// segments (author, repository, rest) for a module to be reported; shorter
/// remainders are ignored. That under-reports paths like `node_modules/pkg`
/// with no file component, which is deliberate: a bare directory entry is a
/// much weaker signal than an actual source file inside the package.
pub fn extract_module_name(path: &str) -> Option<ModuleReference> {
    let idx = path.find(MODULE_ROOT_MARKER)?;
    let after = &path[idx + MODULE_ROOT_MARKER.len()..];

    let parts: Vec<&str> = after.splitn(3, '/').collect();
    if parts.len() < 3 {
        return None;
    }

    let (author, repository, rest) = (parts[0], parts[1], parts[2]);
    if author.starts_with('@') {
        Some(ModuleReference {
            package: format!("{}/{}", author, repository),
            reference: rest.to_string(),
        })
    } else {
        Some(ModuleReference {
            package: author.to_string(),
            reference: format!("{}/{}", repository, rest),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_package() {
        let m = extract_module_name("/out/sources/node_modules/pkg/lib/index.js").unwrap();
        assert_eq!(m.package, "pkg");
        assert_eq!(m.reference, "lib/index.js");
    }

    #[test]
    fn test_scoped_package() {
        let m = extract_module_name("/out/sources/node_modules/@scope/pkg/index.js").unwrap();
        assert_eq!(m.package, "@scope/pkg");
        assert_eq!(m.reference, "index.js");
    }

    #[test]
    fn test_no_marker() {
        assert!(extract_module_name("/out/sources/src/app.js").is_none());
    }

    #[test]
    fn test_too_few_segments() {
        assert!(extract_module_name("/out/sources/node_modules/pkg").is_none());
        assert!(extract_module_name("/out/sources/node_modules/pkg/index.js").is_none());
        assert!(extract_module_name("node_modules/@scope/pkg").is_none());
    }

    #[test]
    fn test_deep_reference_kept_whole() {
        let m = extract_module_name("node_modules/lodash/fp/extend/index.js").unwrap();
        assert_eq!(m.package, "lodash");
        assert_eq!(m.reference, "fp/extend/index.js");
    }
}
