//! Report output model for headless runs.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Component, Path};

/// Report status for a headless run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Passed,
    Failed,
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub elapsed_frames: u64,
    pub elapsed_ms: u64,
    /// Element writes observed by the recording target.
    pub writes: u64,
    /// Writes carrying NaN or infinite values.
    pub non_finite_writes: u64,
}

/// Machine-readable result of a headless run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessReport {
    pub status: ReportStatus,
    pub failed_step_index: Option<usize>,
    pub assertion: Option<String>,
    pub message: Option<String>,
    /// Cycle state when the run ended.
    pub final_state: String,
    #[serde(flatten)]
    pub stats: RunStats,
}

impl HeadlessReport {
    pub fn passed(final_state: &str, stats: RunStats) -> Self {
        Self {
            status: ReportStatus::Passed,
            failed_step_index: None,
            assertion: None,
            message: None,
            final_state: final_state.to_string(),
            stats,
        }
    }

    pub fn failed(
        assertion: &str,
        failed_step_index: usize,
        message: String,
        final_state: &str,
        stats: RunStats,
    ) -> Self {
        Self {
            status: ReportStatus::Failed,
            failed_step_index: Some(failed_step_index),
            assertion: Some(assertion.to_string()),
            message: Some(message),
            final_state: final_state.to_string(),
            stats,
        }
    }

    /// Write the report as JSON to a relative path, creating parent directories.
    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        if path.is_absolute() || path.has_root() {
            bail!("report path must be relative");
        }
        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            bail!("report path cannot contain '..' or drive prefixes");
        }
        let payload = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, payload)?;
        Ok(())
    }

    pub fn write_to_writer<W: Write>(&self, writer: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_json_shape() {
        let stats = RunStats {
            elapsed_frames: 3,
            elapsed_ms: 48,
            writes: 120,
            non_finite_writes: 0,
        };
        let report = HeadlessReport::failed("assert_state", 2, "nope".to_string(), "intro", stats);

        let mut out = Vec::new();
        report.write_to_writer(&mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["status"], "failed");
        assert_eq!(value["failed_step_index"], 2);
        assert_eq!(value["final_state"], "intro");
        assert_eq!(value["elapsed_ms"], 48);
        assert_eq!(value["writes"], 120);
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let report = HeadlessReport::passed("looping", RunStats::default());
        assert!(report.write_to_path(Path::new("/tmp/report.json")).is_err());
        assert!(report.write_to_path(Path::new("../report.json")).is_err());
    }

    #[test]
    fn test_writes_report_under_new_directory() {
        let dir = Path::new("target/report-write-test");
        let _ = std::fs::remove_dir_all(dir);
        let report = HeadlessReport::passed("looping", RunStats::default());

        let path = dir.join("nested/report.json");
        report.write_to_path(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["status"], "passed");
        assert_eq!(value["final_state"], "looping");

        std::fs::remove_dir_all(dir).unwrap();
    }
}
