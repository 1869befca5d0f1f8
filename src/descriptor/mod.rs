//! Package descriptor
//!
//! The package descriptor identifies the package by name and version. It is
//! a read-only input: the pipeline parses the identity fields to name the
//! archive and otherwise copies the file verbatim.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors loading the package descriptor
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("package descriptor not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },

    #[error("package descriptor is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Identity fields of the package descriptor. Unknown fields are preserved
/// on disk (the file is copied byte-identical), only these are parsed.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: String,
}

impl PackageDescriptor {
    /// Load the descriptor from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, DescriptorError> {
        if !path.exists() {
            return Err(DescriptorError::NotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|source| DescriptorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Archive file name for this package: `<name>-<version>.tar.gz`
    pub fn archive_name(&self) -> String {
        format!("{}-{}.tar.gz", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_file_parses_identity() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("package.json");
        fs::write(
            &path,
            r#"{"name":"p","version":"1.0.0","dependencies":{"svelte":"^4"}}"#,
        )
        .unwrap();

        let descriptor = PackageDescriptor::from_file(&path).unwrap();
        assert_eq!(descriptor.name, "p");
        assert_eq!(descriptor.version, "1.0.0");
    }

    #[test]
    fn test_archive_name() {
        let descriptor = PackageDescriptor {
            name: "my-plugin".to_string(),
            version: "2.1.0".to_string(),
        };
        assert_eq!(descriptor.archive_name(), "my-plugin-2.1.0.tar.gz");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = PackageDescriptor::from_file(&dir.path().join("package.json")).unwrap_err();
        assert!(matches!(err, DescriptorError::NotFound(_)));
    }
}
