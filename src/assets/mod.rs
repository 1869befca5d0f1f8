//! Descriptor asset copies
//!
//! The metadata document and package descriptor live alongside the project
//! source; the pipeline copies both into the output directory so the
//! packager can archive a flat trio. Copies are byte-identical and always
//! overwrite any prior copy.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors from the asset copier
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset source not found: {0}")]
    SourceMissing(PathBuf),

    #[error("failed to copy {src} -> {dest}: {source}")]
    Copy {
        src: PathBuf,
        dest: PathBuf,
        source: io::Error,
    },
}

/// Copy one asset into the output directory, overwriting any prior copy.
///
/// Returns the destination path (`out_dir` joined with the source basename).
pub fn copy_into(src: &Path, out_dir: &Path) -> Result<PathBuf, AssetError> {
    if !src.exists() {
        return Err(AssetError::SourceMissing(src.to_path_buf()));
    }
    let basename = src
        .file_name()
        .ok_or_else(|| AssetError::SourceMissing(src.to_path_buf()))?;
    let dest = out_dir.join(basename);
    fs::copy(src, &dest).map_err(|source| AssetError::Copy {
        src: src.to_path_buf(),
        dest: dest.clone(),
        source,
    })?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_is_byte_identical() {
        let project = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let src = project.path().join("schema.json");
        let content = br#"{"name":"p","version":"1.0.0"}"#;
        fs::write(&src, content).unwrap();

        let dest = copy_into(&src, out.path()).unwrap();

        assert_eq!(dest, out.path().join("schema.json"));
        assert_eq!(fs::read(&dest).unwrap(), content);
    }

    #[test]
    fn test_copy_overwrites_prior_copy() {
        let project = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let src = project.path().join("package.json");
        fs::write(&src, "new").unwrap();
        fs::write(out.path().join("package.json"), "stale").unwrap();

        copy_into(&src, out.path()).unwrap();

        assert_eq!(fs::read(out.path().join("package.json")).unwrap(), b"new");
    }

    #[test]
    fn test_missing_source() {
        let project = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let err = copy_into(&project.path().join("absent.json"), out.path()).unwrap_err();
        assert!(matches!(err, AssetError::SourceMissing(_)));
    }
}
