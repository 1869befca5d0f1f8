//! plugin-pack - Post-compilation packaging pipeline
//!
//! This crate takes the output of an external compiler (a named set of byte
//! blobs) plus a metadata document and package descriptor, and deterministically
//! produces a validated, content-addressed distribution artifact: one script
//! with styles inlined, metadata augmented with an integrity hash, descriptor
//! copies, and a single `<name>-<version>.tar.gz` archive.

pub mod archive;
pub mod assets;
pub mod clean;
pub mod descriptor;
pub mod digest;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod styles;

pub use descriptor::PackageDescriptor;
pub use output::{BuildOutput, OutputKind, OutputSet};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineResult};
pub use report::BuildReport;
pub use schema::{MetadataSchema, SchemaValidationError};
