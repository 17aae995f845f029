//! Dependency-ordered code analysis pipelines
//!
//! Agent and task definitions are loaded from YAML, bound to workers, resolved
//! into an execution plan and run once per source unit. Each run's output is
//! synthesized into a sectioned report and written to the output directory.

pub mod cli;
pub mod crew;
pub mod error;
pub mod report;
pub mod source;
pub mod worker;
pub mod workflow;

pub use error::{PipelineError, PipelineResult};
pub use workflow::{
    run_workflow, run_workflow_with, BatchPolicy, BatchSummary, Codesystem, WorkerKind,
    WorkflowConfig,
};
