//! Integrity hashing of the final script
//!
//! The plugin host verifies downloads against a SHA-1 digest carried in the
//! metadata document, so the digest format is fixed by the descriptor
//! protocol: 40 lowercase hex characters over the final script bytes.

use sha1::{Digest, Sha1};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors from the integrity hasher
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// The script file is not present yet. Soft signal: callers skip the
    /// stage instead of aborting the build.
    #[error("artifact not present: {0}")]
    MissingArtifact(PathBuf),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },
}

/// Compute the lowercase hex SHA-1 digest of a byte slice
pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Compute the integrity digest of the script file at `path`.
///
/// Returns `DigestError::MissingArtifact` when the file does not exist,
/// which callers treat as a skip rather than a failure.
pub fn digest_file(path: &Path) -> Result<String, DigestError> {
    if !path.exists() {
        return Err(DigestError::MissingArtifact(path.to_path_buf()));
    }
    let bytes = fs::read(path).map_err(|source| DigestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(digest_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_known_digest() {
        // SHA-1("abc")
        assert_eq!(
            digest_bytes(b"abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_digest_shape() {
        let hex = digest_bytes(b"console.log(1)");
        assert_eq!(hex.len(), 40);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_deterministic_and_distinct() {
        assert_eq!(digest_bytes(b"same"), digest_bytes(b"same"));
        assert_ne!(digest_bytes(b"one"), digest_bytes(b"two"));
        assert_ne!(digest_bytes(b""), digest_bytes(b"x"));
    }

    #[test]
    fn test_digest_file_matches_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plugin.min.js");
        fs::write(&path, b"console.log(1)").unwrap();
        assert_eq!(digest_file(&path).unwrap(), digest_bytes(b"console.log(1)"));
    }

    #[test]
    fn test_missing_file_is_soft_error() {
        let dir = TempDir::new().unwrap();
        let err = digest_file(&dir.path().join("absent.js")).unwrap_err();
        assert!(matches!(err, DigestError::MissingArtifact(_)));
    }
}
