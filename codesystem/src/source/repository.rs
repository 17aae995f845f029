//! Shallow clone of a remote repository

use std::path::Path;
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;

use codesystem_sdk::log_info;

use crate::error::{PipelineError, PipelineResult};

/// A checkout living in a temporary directory, removed on drop
#[derive(Debug)]
pub struct ClonedRepository {
    url: String,
    dir: TempDir,
}

impl ClonedRepository {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// `git clone --depth 1 <url>` into a fresh temporary directory
pub async fn clone_repository(url: &str) -> PipelineResult<ClonedRepository> {
    let acquisition = |message: String| PipelineError::SourceAcquisition {
        url: url.to_string(),
        message,
    };

    let dir = tempfile::Builder::new()
        .prefix("codesystem_clone_")
        .tempdir()
        .map_err(|e| acquisition(format!("cannot create temporary directory: {}", e)))?;

    log_info!("Cloning {} into {}", url, dir.path().display());

    let output = Command::new("git")
        .arg("clone")
        .arg("--depth")
        .arg("1")
        .arg(url)
        .arg(dir.path())
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| acquisition(format!("failed to run git: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(acquisition(format!(
            "git exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(ClonedRepository {
        url: url.to_string(),
        dir,
    })
}
