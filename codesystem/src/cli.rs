//! CLI argument parsing for code analysis runs

use clap::Parser;
use std::path::PathBuf;

use crate::crew::DependencyMode;
use crate::report::ReportMode;
use crate::workflow::{BatchPolicy, WorkerKind, WorkflowConfig};

/// Codesystem CLI Arguments
#[derive(Parser, Debug, Clone)]
#[command(
    name = "codesystem",
    about = "Run role-specific analysis agents over source code and write one report per file"
)]
pub struct Args {
    /// Source file, directory, or repository URL (http://, https://, git://)
    pub input: String,

    /// Directory containing agents.yaml and tasks.yaml
    #[arg(short, long)]
    pub config_dir: Option<PathBuf>,

    /// Directory where reports are written
    #[arg(short, long, default_value = "reports")]
    pub output_dir: PathBuf,

    /// How the report is built (free-text|structured)
    #[arg(long, default_value = "free-text")]
    pub report_mode: ReportMode,

    /// What a failing file does to the rest of a batch (abort|skip)
    #[arg(long, default_value = "abort")]
    pub batch_policy: BatchPolicy,

    /// How task dependencies are resolved (legacy|strict)
    #[arg(long, default_value = "legacy")]
    pub dependency_mode: DependencyMode,

    /// Worker implementation (claude|stub)
    #[arg(long, default_value = "claude")]
    pub worker: WorkerKind,

    /// Maximum conversation turns per agent task
    #[arg(long, env = "CODESYSTEM_MAX_TURNS")]
    pub max_turns: Option<u32>,

    /// Comma-separated file extensions to analyze when walking a tree
    #[arg(long, value_delimiter = ',')]
    pub extensions: Vec<String>,
}

impl From<Args> for WorkflowConfig {
    fn from(args: Args) -> Self {
        let defaults = WorkflowConfig::default();
        WorkflowConfig {
            input: args.input,
            config_dir: args.config_dir.unwrap_or(defaults.config_dir),
            output_dir: args.output_dir,
            report_mode: args.report_mode,
            batch_policy: args.batch_policy,
            dependency_mode: args.dependency_mode,
            worker_kind: args.worker,
            max_turns: args.max_turns,
            extensions: if args.extensions.is_empty() {
                defaults.extensions
            } else {
                args.extensions
            },
        }
    }
}
