//! Error taxonomy for building and running analysis pipelines

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("task '{task}' references unknown agent '{agent}'")]
    UnresolvedAgent { task: String, agent: String },

    #[error("task '{task}' depends on unknown task '{dependency}'")]
    UnresolvedDependency { task: String, dependency: String },

    #[error("dependency cycle among tasks: {}", .0.join(", "))]
    DependencyCycle(Vec<String>),

    #[error("worker invocation failed for task '{task}': {message}")]
    WorkerInvocation { task: String, message: String },

    #[error("failed to read source '{path}': {source}")]
    SourceRead {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to acquire repository '{url}': {message}")]
    SourceAcquisition { url: String, message: String },

    #[error("failed to write artifact '{}': {source}", .path.display())]
    ArtifactWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl PipelineError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether a batch may drop the affected unit and keep going
    pub fn is_skippable_read(&self) -> bool {
        matches!(self, Self::SourceRead { .. })
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
