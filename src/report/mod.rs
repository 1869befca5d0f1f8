//! Build report (build_report.json)
//!
//! Written to the output directory after packaging; records what the build
//! produced and how long each stage took. Diagnostic only: the report is not
//! part of the packaged archive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Schema version for build_report.json
pub const BUILD_REPORT_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for build_report.json
pub const BUILD_REPORT_SCHEMA_ID: &str = "plugin-pack/build_report@1";

/// Wall-clock timing for one pipeline stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTiming {
    /// Stage name (validate, clean, inline, assets, augment, package)
    pub stage: String,

    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Build report (build_report.json)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// Unique identifier for this build invocation
    pub build_id: String,

    /// When the report was created
    pub created_at: DateTime<Utc>,

    /// Package name from the descriptor
    pub package_name: String,

    /// Package version from the descriptor
    pub package_version: String,

    /// Integrity digest of the final script (lowercase hex SHA-1)
    pub digest: String,

    /// File name of the packaged archive
    pub archive: String,

    /// Per-stage wall-clock timings, in execution order
    pub stages: Vec<StageTiming>,
}

impl BuildReport {
    pub fn new(
        package_name: String,
        package_version: String,
        digest: String,
        archive: String,
        stages: Vec<StageTiming>,
    ) -> Self {
        Self {
            schema_version: BUILD_REPORT_SCHEMA_VERSION,
            schema_id: BUILD_REPORT_SCHEMA_ID.to_string(),
            build_id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            package_name,
            package_version,
            digest,
            archive,
            stages,
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn write(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }

    /// One-line human summary for CLI output
    pub fn human_summary(&self) -> String {
        format!(
            "packaged {} {} -> {} (sha1 {})",
            self.package_name, self.package_version, self.archive, self.digest
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> BuildReport {
        BuildReport::new(
            "p".to_string(),
            "1.0.0".to_string(),
            "a9993e364706816aba3e25717850c26c9cd0d89d".to_string(),
            "p-1.0.0.tar.gz".to_string(),
            vec![StageTiming {
                stage: "package".to_string(),
                duration_ms: 3,
            }],
        )
    }

    #[test]
    fn test_schema_header() {
        let report = sample();
        assert_eq!(report.schema_version, BUILD_REPORT_SCHEMA_VERSION);
        assert_eq!(report.schema_id, BUILD_REPORT_SCHEMA_ID);
        assert!(!report.build_id.is_empty());
    }

    #[test]
    fn test_write_and_reparse() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build_report.json");
        sample().write(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let reread: BuildReport = serde_json::from_str(&text).unwrap();
        assert_eq!(reread.archive, "p-1.0.0.tar.gz");
        assert_eq!(reread.stages.len(), 1);
    }

    #[test]
    fn test_human_summary() {
        let summary = sample().human_summary();
        assert!(summary.contains("p 1.0.0"));
        assert!(summary.contains("p-1.0.0.tar.gz"));
    }
}
