//! Output-directory cleaning
//!
//! A build must never leave two archives for different versions side by
//! side, so the cleaner removes every previously packaged archive before any
//! new output lands.

use std::fs;
use std::io;
use std::path::Path;

/// Suffix that identifies a packaged archive
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Remove every stale archive (`*.tar.gz`) from the output directory.
///
/// A missing output directory is a no-op, not an error; so is an empty one.
/// Non-archive files are left untouched. Returns the paths that were removed.
pub fn clean_stale_archives(out_dir: &Path) -> io::Result<Vec<std::path::PathBuf>> {
    let mut removed = Vec::new();

    if !out_dir.exists() {
        return Ok(removed);
    }

    for entry in fs::read_dir(out_dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_archive = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(ARCHIVE_SUFFIX));
        if is_archive && path.is_file() {
            fs::remove_file(&path)?;
            removed.push(path);
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_removes_only_archives() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("foo-1.0.0.tar.gz"), "old archive").unwrap();
        fs::write(dir.path().join("bar.js"), "script").unwrap();

        let removed = clean_stale_archives(dir.path()).unwrap();

        assert_eq!(removed.len(), 1);
        assert!(!dir.path().join("foo-1.0.0.tar.gz").exists());
        assert!(dir.path().join("bar.js").exists());
    }

    #[test]
    fn test_missing_directory_is_noop() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let removed = clean_stale_archives(&missing).unwrap();
        assert!(removed.is_empty());
    }

    #[test]
    fn test_empty_directory_is_noop() {
        let dir = TempDir::new().unwrap();
        let removed = clean_stale_archives(dir.path()).unwrap();
        assert!(removed.is_empty());
    }

    #[test]
    fn test_removes_multiple_archives() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("p-1.0.0.tar.gz"), "a").unwrap();
        fs::write(dir.path().join("p-1.0.1.tar.gz"), "b").unwrap();

        let removed = clean_stale_archives(dir.path()).unwrap();
        assert_eq!(removed.len(), 2);
    }
}
