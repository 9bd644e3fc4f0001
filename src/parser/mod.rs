//! Parser module: read reflected descriptors and populate the graph.
//!
//! Source reflection happens upstream; this crate consumes its JSON output
//! (see [`manifest::Manifest`]). Multiple manifests feed one [`Populator`],
//! and [`Populator::finish`] runs the linking pass that wires inheritance.

pub mod link;
pub mod manifest;

pub use manifest::{Manifest, Populator};

use crate::descriptor::GraphError;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),
}

/// Parse a manifest file based on its extension.
pub fn parse_file(path: &Path, content: &str) -> Result<Manifest, ManifestError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse(content),
        _ => Err(ManifestError::UnsupportedFile(path.display().to_string())),
    }
}

/// Parse manifest JSON.
pub fn parse(content: &str) -> Result<Manifest, ManifestError> {
    Ok(serde_json::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_extension() {
        let err = parse_file(Path::new("Foo.php"), "{}").unwrap_err();
        assert!(matches!(err, ManifestError::UnsupportedFile(_)));
    }

    #[test]
    fn empty_object_is_an_empty_manifest() {
        let manifest = parse_file(Path::new("out.json"), "{}").unwrap();
        assert!(manifest.files.is_empty());
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = parse("{ \"files\": [").unwrap_err();
        assert!(err.to_string().starts_with("invalid manifest"));
    }
}
