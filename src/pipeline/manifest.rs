//! Run report, also persisted as `run_summary.json` in the output root.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::constants::RUN_SUMMARY_FILE;
use crate::error::Result;

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub output_dir: String,
    pub max_rows_per_file: usize,
    pub keyword_count: usize,
    pub sources: Vec<SourceSummary>,
    pub products: Vec<ProductReport>,
    pub duration_secs: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    pub name: String,
    pub path: String,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductReport {
    pub task: u8,
    pub name: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub files: Vec<ProductFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityCounts>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductFile {
    pub path: String,
    pub rows: usize,
    pub sha256: String,
}

/// Split of the security summary by flag value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SecurityCounts {
    pub flagged: usize,
    pub clean: usize,
}

impl RunReport {
    pub fn product(&self, name: &str) -> Option<&ProductReport> {
        self.products.iter().find(|p| p.name == name)
    }
}

/// Hex SHA-256 of a written file.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut file = File::open(path)?;
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

/// Persist the report as pretty JSON under `output_dir`.
pub fn write_manifest(report: &RunReport, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let filepath = output_dir.join(RUN_SUMMARY_FILE);
    let json_content = serde_json::to_string_pretty(report)?;
    fs::write(&filepath, json_content)?;
    Ok(filepath)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.csv");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_manifest_round_trips_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let report = RunReport {
            generated_at: Utc::now(),
            output_dir: dir.path().display().to_string(),
            max_rows_per_file: 25_000,
            keyword_count: 39,
            sources: vec![],
            products: vec![ProductReport {
                task: 5,
                name: "pr_security_summary".into(),
                rows: 1,
                columns: vec!["ID".into()],
                files: vec![],
                security: Some(SecurityCounts { flagged: 1, clean: 0 }),
            }],
            duration_secs: 0.5,
        };
        let path = write_manifest(&report, dir.path()).unwrap();
        assert!(path.ends_with("run_summary.json"));

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["products"][0]["security"]["flagged"], 1);
        assert_eq!(value["max_rows_per_file"], 25_000);
        assert!(report.product("pr_security_summary").is_some());
        assert!(report.product("missing").is_none());
    }
}
