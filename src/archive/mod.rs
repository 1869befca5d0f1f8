//! Archive packaging
//!
//! The terminal stage: the final script, augmented metadata, and package
//! descriptor are archived into one gzip-compressed tar named
//! `<name>-<version>.tar.gz`. Entries are stored by basename so extraction
//! reproduces a flat directory.
//!
//! Tar headers are canonicalized (mtime 0, uid/gid 0, mode 0644) and the
//! gzip header carries no timestamp, so repeat builds over identical inputs
//! produce byte-identical archives.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tar::{Builder, Header};

/// Errors from the packager. Always fatal; the build is reported as failed.
#[derive(Debug, thiserror::Error)]
pub enum PackagingError {
    #[error("archive entry missing from output directory: {0}")]
    EntryMissing(PathBuf),

    #[error("archive entry has no basename: {0}")]
    InvalidEntry(PathBuf),

    #[error("write not acknowledged as complete before packaging: {0}")]
    WriteUnacknowledged(PathBuf),

    #[error("IO error while writing archive: {0}")]
    Io(#[from] io::Error),
}

/// Package the named entries from `out_dir` into `out_dir/<archive_name>`.
///
/// Entry names inside the archive are the file basenames. Returns the path
/// of the written archive. Any I/O failure during stream writing surfaces
/// as `PackagingError`.
pub fn package(
    out_dir: &Path,
    entries: &[&Path],
    archive_name: &str,
) -> Result<PathBuf, PackagingError> {
    let mut tar_bytes = Vec::new();
    {
        let mut builder = Builder::new(&mut tar_bytes);
        for entry in entries {
            append_canonical(&mut builder, entry)?;
        }
        builder.finish()?;
    }

    let archive_path = out_dir.join(archive_name);
    let file = File::create(&archive_path)?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(&tar_bytes)?;
    let file = encoder.finish()?;
    file.sync_all()?;

    Ok(archive_path)
}

/// Append one file with a canonical header: basename path, epoch mtime,
/// uid/gid 0, mode 0644.
fn append_canonical(builder: &mut Builder<&mut Vec<u8>>, path: &Path) -> Result<(), PackagingError> {
    if !path.is_file() {
        return Err(PackagingError::EntryMissing(path.to_path_buf()));
    }
    let basename = path
        .file_name()
        .ok_or_else(|| PackagingError::InvalidEntry(path.to_path_buf()))?;
    let contents = fs::read(path)?;

    let mut header = Header::new_gnu();
    header.set_path(basename)?;
    header.set_size(contents.len() as u64);
    header.set_mtime(0);
    header.set_uid(0);
    header.set_gid(0);
    header.set_mode(0o644);
    header.set_cksum();

    builder.append(&header, contents.as_slice())?;
    Ok(())
}
