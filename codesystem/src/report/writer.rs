//! Persisting reports under an output directory

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs;

use codesystem_sdk::log_file_saved;

use crate::error::{PipelineError, PipelineResult};
use crate::report::types::Report;

/// Base name used when no source identifier is available
pub const FALLBACK_BASE: &str = "code_analysis_report";
/// Extension of written artifacts
pub const ARTIFACT_EXTENSION: &str = "md";
/// Second-precision timestamp; two writes in the same second share a name
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Writes one artifact per report into a flat output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `report`, naming the file after `name_hint` and the current time
    pub async fn write(&self, report: &Report, name_hint: Option<&str>) -> PipelineResult<PathBuf> {
        self.write_at(report, name_hint, Local::now()).await
    }

    /// Same as [`ReportWriter::write`] with an explicit timestamp
    pub async fn write_at(
        &self,
        report: &Report,
        name_hint: Option<&str>,
        now: DateTime<Local>,
    ) -> PipelineResult<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| PipelineError::ArtifactWrite {
                path: self.output_dir.clone(),
                source,
            })?;

        let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
        let path = self.output_dir.join(artifact_file_name(name_hint, &timestamp));

        fs::write(&path, report.to_markdown())
            .await
            .map_err(|source| PipelineError::ArtifactWrite {
                path: path.clone(),
                source,
            })?;

        log_file_saved!(path.display());
        Ok(path)
    }
}

/// `<stem>_analysis_<timestamp>.md` for a hint, `code_analysis_report_<timestamp>.md` otherwise
pub fn artifact_file_name(name_hint: Option<&str>, timestamp: &str) -> String {
    match name_hint.and_then(base_name) {
        Some(base) => format!("{}_analysis_{}.{}", base, timestamp, ARTIFACT_EXTENSION),
        None => format!("{}_{}.{}", FALLBACK_BASE, timestamp, ARTIFACT_EXTENSION),
    }
}

/// Final path component without extension, sanitized; `None` when nothing is left
pub fn base_name(hint: &str) -> Option<String> {
    let stem = Path::new(hint.trim()).file_stem()?.to_string_lossy();
    let sanitized = sanitize(&stem);
    (!sanitized.is_empty()).then_some(sanitized)
}

/// Replace every character outside `[alphanumeric _ -]` with `_`
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
