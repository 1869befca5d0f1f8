//! Metadata augmentation
//!
//! Merges the integrity digest and the package version into the metadata
//! document already copied into the output directory. The merge is
//! non-destructive (only `hash` and `version` are overwritten) and the
//! rewrite is a whole-document atomic replace: the new bytes land in a
//! temporary file that is renamed over the target, so a concurrent reader of
//! the final path never observes a partial document.

use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors from the metadata augmenter
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// No metadata document at the target path yet. Soft signal: the caller
    /// skips the stage instead of aborting the build.
    #[error("artifact not present: {0}")]
    MissingArtifact(PathBuf),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },

    #[error("metadata document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("metadata document is not a JSON object")]
    NotAnObject,
}

/// Load a JSON document from disk
pub fn read_document(path: &Path) -> Result<Value, MetadataError> {
    if !path.exists() {
        return Err(MetadataError::MissingArtifact(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Produce a new document equal to `document` with `hash` and `version` set.
///
/// Every other key is preserved verbatim.
pub fn augment(document: &Value, hash: &str, version: &str) -> Result<Value, MetadataError> {
    let object = document.as_object().ok_or(MetadataError::NotAnObject)?;
    let mut merged: Map<String, Value> = object.clone();
    merged.insert("hash".to_string(), Value::String(hash.to_string()));
    merged.insert("version".to_string(), Value::String(version.to_string()));
    Ok(Value::Object(merged))
}

/// Augment the metadata document at `path` in place, atomically.
///
/// Reads the current document, merges `hash` and `version`, and replaces the
/// file in a single rename. Returns `MissingArtifact` when no document
/// exists at `path` (a skip, not a failure).
pub fn augment_file(path: &Path, hash: &str, version: &str) -> Result<(), MetadataError> {
    let document = read_document(path)?;
    let merged = augment(&document, hash, version)?;
    write_document_atomic(path, &merged)
}

/// Write a pretty-printed JSON document with a temp-file-then-rename replace.
pub fn write_document_atomic(path: &Path, document: &Value) -> Result<(), MetadataError> {
    let json = serde_json::to_string_pretty(document)?;
    let tmp = tmp_sibling(path);

    let io_err = |source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    };

    fs::write(&tmp, &json).map_err(io_err)?;
    // Sync before the rename so the replace is durable, not just atomic.
    fs::File::open(&tmp).and_then(|f| f.sync_all()).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_augment_sets_hash_and_version() {
        let doc = json!({"name": "p", "version": "0.0.1"});
        let merged = augment(&doc, "abc123", "1.0.0").unwrap();
        assert_eq!(merged["hash"], "abc123");
        assert_eq!(merged["version"], "1.0.0");
        assert_eq!(merged["name"], "p");
    }

    #[test]
    fn test_augment_preserves_other_fields() {
        let doc = json!({
            "name": "p",
            "type": "component",
            "schema": {"settings": [{"key": "text"}]},
            "icon": "Bold"
        });
        let merged = augment(&doc, "h", "2.0.0").unwrap();
        for key in ["name", "type", "schema", "icon"] {
            assert_eq!(merged[key], doc[key], "key '{}' must survive the merge", key);
        }
    }

    #[test]
    fn test_augment_overwrites_prior_hash() {
        let doc = json!({"name": "p", "hash": "stale", "version": "0.9.0"});
        let merged = augment(&doc, "fresh", "1.0.0").unwrap();
        assert_eq!(merged["hash"], "fresh");
        assert_eq!(merged["version"], "1.0.0");
    }

    #[test]
    fn test_augment_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, r#"{"name":"p","extra":[1,2,3]}"#).unwrap();

        augment_file(&path, "deadbeef", "1.2.3").unwrap();

        let reread = read_document(&path).unwrap();
        assert_eq!(reread["hash"], "deadbeef");
        assert_eq!(reread["version"], "1.2.3");
        assert_eq!(reread["extra"], json!([1, 2, 3]));
        // No temp file left behind
        assert!(!dir.path().join("schema.json.tmp").exists());
    }

    #[test]
    fn test_missing_document_is_soft_error() {
        let dir = TempDir::new().unwrap();
        let err = augment_file(&dir.path().join("schema.json"), "h", "v").unwrap_err();
        assert!(matches!(err, MetadataError::MissingArtifact(_)));
    }

    #[test]
    fn test_non_object_document_rejected() {
        let err = augment(&json!([1, 2]), "h", "v").unwrap_err();
        assert!(matches!(err, MetadataError::NotAnObject));
    }
}
