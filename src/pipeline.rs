//! Pipeline orchestration
//!
//! Composes the packaging stages in a fixed sequence over one build
//! invocation:
//! - Validate the metadata document (aborts before any output mutation)
//! - Clean stale archives
//! - Inline styles into the script and write the final script
//! - Copy descriptor assets
//! - Hash the final script and augment the metadata (exactly once)
//! - Package the trio into `<name>-<version>.tar.gz`
//! - Write the build report
//!
//! Stages run strictly sequentially; the output directory is the only shared
//! mutable resource. Every write is acknowledged in a `WriteLedger` after it
//! has returned success and been synced, and the packager requires an
//! acknowledgment for each of its inputs instead of sleeping out a guessed
//! flush window.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use thiserror::Error;

use crate::archive::{self, PackagingError};
use crate::assets::{self, AssetError};
use crate::clean::clean_stale_archives;
use crate::descriptor::{DescriptorError, PackageDescriptor};
use crate::digest::{digest_file, DigestError};
use crate::metadata::{self, MetadataError};
use crate::output::{OutputError, OutputSet};
use crate::report::{BuildReport, StageTiming};
use crate::schema::{MetadataSchema, SchemaValidationError};
use crate::styles::StyleBundle;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("schema validation error: {0}")]
    SchemaValidation(#[from] SchemaValidationError),

    #[error("package descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("build output error: {0}")]
    Output(#[from] OutputError),

    #[error("asset copy error: {0}")]
    Asset(#[from] AssetError),

    #[error("integrity digest error: {0}")]
    Digest(#[from] DigestError),

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("packaging error: {0}")]
    Packaging(#[from] PackagingError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::SchemaValidation(_) => 10,
            PipelineError::Descriptor(_) => 11,
            PipelineError::Output(_) => 12,
            PipelineError::Asset(_) => 40,
            PipelineError::Digest(_) => 40,
            PipelineError::Metadata(_) => 40,
            PipelineError::Packaging(_) => 70,
            PipelineError::Io(_) => 1,
            PipelineError::Serialization(_) => 1,
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Ledger of completed writes to the output directory.
///
/// A path is recorded only after the underlying write has returned success
/// and the file has been synced, so a recorded path is observably complete.
/// The packager requires a record for every file it is about to archive.
#[derive(Debug, Default)]
pub struct WriteLedger {
    completed: BTreeSet<PathBuf>,
}

impl WriteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acknowledge a completed write
    pub fn record(&mut self, path: &Path) {
        self.completed.insert(path.to_path_buf());
    }

    /// Whether a write to `path` has been acknowledged
    pub fn is_complete(&self, path: &Path) -> bool {
        self.completed.contains(path)
    }

    /// Require an acknowledgment for every path, returning the first
    /// unacknowledged one on failure.
    pub fn require(&self, paths: &[&Path]) -> Result<(), PathBuf> {
        for path in paths {
            if !self.is_complete(path) {
                return Err(path.to_path_buf());
            }
        }
        Ok(())
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path to the metadata document in the project
    pub metadata_path: PathBuf,

    /// Path to the package descriptor in the project
    pub descriptor_path: PathBuf,

    /// Output directory
    pub out_dir: PathBuf,

    /// Fixed name of the script output
    pub script_name: String,

    /// Verbose stage logging on stderr
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            metadata_path: PathBuf::from("schema.json"),
            descriptor_path: PathBuf::from("package.json"),
            out_dir: PathBuf::from("dist"),
            script_name: "plugin.min.js".to_string(),
            verbose: false,
        }
    }
}

/// Pipeline execution context for one build invocation
pub struct Pipeline {
    config: PipelineConfig,
    schema: MetadataSchema,
    ledger: WriteLedger,
    timings: Vec<StageTiming>,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            schema: MetadataSchema::default(),
            ledger: WriteLedger::new(),
            timings: Vec::new(),
        }
    }

    /// Use a non-default metadata schema
    pub fn with_schema(mut self, schema: MetadataSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Run the full pipeline over one build's compiler outputs.
    ///
    /// Validation runs before any output-directory mutation; a validation
    /// failure aborts with nothing written. A failure in a later stage
    /// leaves the output directory partially built, which callers must
    /// treat as invalid.
    pub fn run(&mut self, mut outputs: OutputSet) -> PipelineResult<BuildReport> {
        // Validate first: the only stage allowed to halt before compilation
        // output is touched.
        let start = Instant::now();
        let document = metadata::read_document(&self.config.metadata_path)?;
        self.schema.validate(&document)?;
        let descriptor = PackageDescriptor::from_file(&self.config.descriptor_path)?;
        self.finish_stage("validate", start);
        self.log(&format!(
            "validated {} ({} {})",
            self.config.metadata_path.display(),
            descriptor.name,
            descriptor.version
        ));

        let start = Instant::now();
        let removed = clean_stale_archives(&self.config.out_dir)?;
        self.finish_stage("clean", start);
        if !removed.is_empty() {
            self.log(&format!("removed {} stale archive(s)", removed.len()));
        }

        fs::create_dir_all(&self.config.out_dir)?;

        let script_path = self.inline_styles(&mut outputs)?;
        let (metadata_dest, descriptor_dest) = self.copy_assets()?;
        let digest = self.augment_metadata(&script_path, &metadata_dest, &descriptor.version)?;
        let archive_path =
            self.package(&descriptor, &script_path, &metadata_dest, &descriptor_dest)?;

        let report = BuildReport::new(
            descriptor.name.clone(),
            descriptor.version.clone(),
            digest.unwrap_or_default(),
            descriptor.archive_name(),
            std::mem::take(&mut self.timings),
        );
        report.write(&self.config.out_dir.join("build_report.json"))?;
        self.log(&format!("archive written: {}", archive_path.display()));

        Ok(report)
    }

    /// Collect stylesheet outputs, inject them into the script, and write
    /// the final script into the output directory.
    fn inline_styles(&mut self, outputs: &mut OutputSet) -> PipelineResult<PathBuf> {
        let start = Instant::now();

        let bundle = StyleBundle::collect(outputs);
        if !bundle.is_empty() {
            self.log(&format!("inlining {} byte(s) of styles", bundle.css().len()));
        }

        let script = outputs.script_mut(&self.config.script_name)?;
        let final_bytes = bundle.inject(std::mem::take(&mut script.bytes));

        let script_path = self.config.out_dir.join(&self.config.script_name);
        self.write_acknowledged(&script_path, &final_bytes)?;

        self.finish_stage("inline", start);
        Ok(script_path)
    }

    /// Copy the metadata document and package descriptor into the output
    /// directory.
    fn copy_assets(&mut self) -> PipelineResult<(PathBuf, PathBuf)> {
        let start = Instant::now();

        let metadata_dest = assets::copy_into(&self.config.metadata_path, &self.config.out_dir)?;
        self.acknowledge(&metadata_dest)?;
        let descriptor_dest =
            assets::copy_into(&self.config.descriptor_path, &self.config.out_dir)?;
        self.acknowledge(&descriptor_dest)?;

        self.finish_stage("assets", start);
        Ok((metadata_dest, descriptor_dest))
    }

    /// Hash the final script and merge the digest and version into the
    /// output-directory metadata document. Runs exactly once per build.
    ///
    /// Missing-artifact signals are soft: the stage logs the skip and the
    /// build continues, because hashing and augmentation are tolerant of
    /// being wired in before their inputs exist.
    fn augment_metadata(
        &mut self,
        script_path: &Path,
        metadata_dest: &Path,
        version: &str,
    ) -> PipelineResult<Option<String>> {
        let start = Instant::now();

        let digest = match digest_file(script_path) {
            Ok(digest) => digest,
            Err(DigestError::MissingArtifact(path)) => {
                eprintln!("skipping hash: {} not present yet", path.display());
                self.finish_stage("augment", start);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match metadata::augment_file(metadata_dest, &digest, version) {
            Ok(()) => {
                // The replace rewrote the file; re-acknowledge the path.
                self.ledger.record(metadata_dest);
            }
            Err(MetadataError::MissingArtifact(path)) => {
                eprintln!("skipping metadata update: {} not present yet", path.display());
            }
            Err(e) => return Err(e.into()),
        }

        self.finish_stage("augment", start);
        Ok(Some(digest))
    }

    /// Archive the final trio, requiring a completed-write acknowledgment
    /// for each entry first.
    fn package(
        &mut self,
        descriptor: &PackageDescriptor,
        script_path: &Path,
        metadata_dest: &Path,
        descriptor_dest: &Path,
    ) -> PipelineResult<PathBuf> {
        let start = Instant::now();

        let entries = [script_path, metadata_dest, descriptor_dest];
        self.ledger
            .require(&entries)
            .map_err(PackagingError::WriteUnacknowledged)?;

        let archive_path = archive::package(
            &self.config.out_dir,
            &entries,
            &descriptor.archive_name(),
        )?;

        self.finish_stage("package", start);
        Ok(archive_path)
    }

    /// Write bytes, sync, and acknowledge the path in the ledger
    fn write_acknowledged(&mut self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        fs::write(path, bytes)?;
        File::open(path)?.sync_all()?;
        self.ledger.record(path);
        Ok(())
    }

    /// Sync and acknowledge a file written by another stage
    fn acknowledge(&mut self, path: &Path) -> io::Result<()> {
        File::open(path)?.sync_all()?;
        self.ledger.record(path);
        Ok(())
    }

    fn finish_stage(&mut self, stage: &str, start: Instant) {
        self.timings.push(StageTiming {
            stage: stage.to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
        });
    }

    fn log(&self, message: &str) {
        if self.config.verbose {
            eprintln!("{}", message);
        }
    }
}
