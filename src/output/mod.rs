//! Compiler build outputs
//!
//! The compiler front-end is a black box that hands the pipeline an unordered
//! set of named byte blobs. `OutputSet` preserves the emission (insertion)
//! order, which is what makes style concatenation deterministic downstream.

use std::path::Path;

/// Kind of a compiler build output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// The executable script bundle (exactly one per build)
    Script,
    /// An extracted stylesheet fragment (zero or more per build)
    Stylesheet,
    /// Anything else the compiler emitted (source maps, licenses, ...)
    Other,
}

impl OutputKind {
    /// Classify an output by file name: the fixed script name maps to
    /// `Script`, a `.css` extension to `Stylesheet`, everything else to
    /// `Other`.
    pub fn from_name(name: &str, script_name: &str) -> Self {
        if name == script_name {
            OutputKind::Script
        } else if Path::new(name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("css"))
        {
            OutputKind::Stylesheet
        } else {
            OutputKind::Other
        }
    }
}

/// A named, typed byte blob produced by the compiler
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Name, unique within a build
    pub name: String,
    /// Output kind
    pub kind: OutputKind,
    /// Raw content
    pub bytes: Vec<u8>,
}

impl BuildOutput {
    pub fn new(name: impl Into<String>, kind: OutputKind, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind,
            bytes,
        }
    }
}

/// Error for output-set operations
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("duplicate output name: {0}")]
    DuplicateName(String),

    #[error("no script output named '{0}' in the build output set")]
    MissingScript(String),
}

/// Insertion-ordered set of build outputs, keyed by unique name
#[derive(Debug, Default)]
pub struct OutputSet {
    entries: Vec<BuildOutput>,
}

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output, rejecting duplicate names
    pub fn insert(&mut self, output: BuildOutput) -> Result<(), OutputError> {
        if self.entries.iter().any(|e| e.name == output.name) {
            return Err(OutputError::DuplicateName(output.name));
        }
        self.entries.push(output);
        Ok(())
    }

    /// Remove and return every stylesheet output, preserving insertion order.
    ///
    /// Stylesheets are consumed by the inliner and must not reach the final
    /// artifact, so draining is the only access the pipeline has to them.
    pub fn drain_stylesheets(&mut self) -> Vec<BuildOutput> {
        let mut styles = Vec::new();
        self.entries.retain_mut(|e| {
            if e.kind == OutputKind::Stylesheet {
                styles.push(BuildOutput {
                    name: std::mem::take(&mut e.name),
                    kind: e.kind,
                    bytes: std::mem::take(&mut e.bytes),
                });
                false
            } else {
                true
            }
        });
        styles
    }

    /// Borrow the script output mutably
    pub fn script_mut(&mut self, script_name: &str) -> Result<&mut BuildOutput, OutputError> {
        self.entries
            .iter_mut()
            .find(|e| e.kind == OutputKind::Script && e.name == script_name)
            .ok_or_else(|| OutputError::MissingScript(script_name.to_string()))
    }

    /// Borrow the script output
    pub fn script(&self, script_name: &str) -> Result<&BuildOutput, OutputError> {
        self.entries
            .iter()
            .find(|e| e.kind == OutputKind::Script && e.name == script_name)
            .ok_or_else(|| OutputError::MissingScript(script_name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildOutput> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
