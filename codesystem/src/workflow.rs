//! Workflow orchestration for code analysis runs
//!
//! [`Codesystem`] owns the read-only worker registry and execution plan and
//! processes one source unit at a time: execute, synthesize, write.
//! [`run_workflow`] is the process-level entry point that turns a
//! [`WorkflowConfig`] into source units and feeds them through the pipeline.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use codesystem_sdk::{
    log_found, log_info, log_progress, log_report_written, log_run_complete, log_run_failed,
    log_run_start, log_section_console, log_source_skipped, log_warning, RunId,
};

use crate::crew::{
    build_plan, load_definitions, run_plan, Definitions, DependencyMode, ExecutionPlan,
    RunContext, WorkerRegistry,
};
use crate::error::PipelineResult;
use crate::report::{synthesize_outcome, ReportMode, ReportWriter};
use crate::source::{
    clone_repository, collect_sources, read_code_file, InputKind, SourceFile, SourceUnit,
    DEFAULT_EXTENSIONS,
};
use crate::worker::{ClaudeAgentWorker, ClaudeSettings, StubJournal, StubWorker, WorkerFactory};

/// What happens to a batch when one unit fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Stop at the first failing unit; later units are never attempted
    #[default]
    Abort,
    /// Record the failure and continue with the next unit
    Skip,
}

impl std::str::FromStr for BatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(format!("unknown batch policy '{}' (abort|skip)", other)),
        }
    }
}

/// Which worker implementation backs the agents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkerKind {
    #[default]
    Claude,
    /// Deterministic echo worker, useful for dry runs
    Stub,
}

impl std::str::FromStr for WorkerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude" => Ok(Self::Claude),
            "stub" => Ok(Self::Stub),
            other => Err(format!("unknown worker kind '{}' (claude|stub)", other)),
        }
    }
}

/// Configuration for a code analysis run
///
/// # Examples
///
/// ```no_run
/// use codesystem::workflow::{BatchPolicy, WorkflowConfig};
///
/// let config = WorkflowConfig {
///     input: "https://github.com/org/repo".to_string(),
///     batch_policy: BatchPolicy::Skip,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// File path, directory, or repository URL
    pub input: String,
    /// Directory holding `agents.yaml` and `tasks.yaml`
    pub config_dir: PathBuf,
    pub output_dir: PathBuf,
    pub report_mode: ReportMode,
    pub batch_policy: BatchPolicy,
    pub dependency_mode: DependencyMode,
    pub worker_kind: WorkerKind,
    /// Turn limit for each agent session
    pub max_turns: Option<u32>,
    /// Extensions considered when walking a tree
    pub extensions: Vec<String>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            input: String::new(),
            config_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/config")),
            output_dir: PathBuf::from("reports"),
            report_mode: ReportMode::default(),
            batch_policy: BatchPolicy::default(),
            dependency_mode: DependencyMode::default(),
            worker_kind: WorkerKind::default(),
            max_turns: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Result of processing several units
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Artifacts written, in processing order
    pub artifacts: Vec<PathBuf>,
    /// Units dropped before analysis (unreadable or empty)
    pub skipped: Vec<String>,
    /// Units whose run failed, with the error message
    pub failed: Vec<(String, String)>,
}

/// The assembled pipeline: registry, plan and writer, shared by every unit
pub struct Codesystem {
    registry: WorkerRegistry,
    plan: ExecutionPlan,
    writer: ReportWriter,
    report_mode: ReportMode,
}

impl Codesystem {
    /// Build the registry and the execution plan.
    ///
    /// Configuration and graph errors surface here, before any worker runs.
    pub fn new(
        definitions: &Definitions,
        factory: &dyn WorkerFactory,
        config: &WorkflowConfig,
    ) -> PipelineResult<Self> {
        let registry = WorkerRegistry::build(&definitions.agents, factory)?;
        let plan = build_plan(&definitions.tasks, &registry, config.dependency_mode)?;

        Ok(Self {
            registry,
            plan,
            writer: ReportWriter::new(config.output_dir.clone()),
            report_mode: config.report_mode,
        })
    }

    pub fn registry(&self) -> &WorkerRegistry {
        &self.registry
    }

    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }

    pub fn output_dir(&self) -> &Path {
        self.writer.output_dir()
    }

    /// Execute, synthesize and write one unit. Returns the artifact path.
    pub async fn process_one(&self, identifier: &str, content: &str) -> PipelineResult<PathBuf> {
        let run_id = RunId::new();
        log_section_console!("Processing", identifier);
        log_run_start!(run_id, identifier, self.plan.len());

        match self.run_unit(identifier, content).await {
            Ok(path) => {
                log_run_complete!(run_id, identifier, path.display());
                Ok(path)
            }
            Err(e) => {
                log_run_failed!(run_id, identifier, e);
                Err(e)
            }
        }
    }

    async fn run_unit(&self, identifier: &str, content: &str) -> PipelineResult<PathBuf> {
        let outcome = run_plan(&self.plan, RunContext::new(identifier, content)).await?;
        let report = synthesize_outcome(&outcome, self.report_mode, identifier);
        let path = self.writer.write(&report, Some(identifier)).await?;
        log_report_written!(identifier, path.display());
        Ok(path)
    }

    /// Process units one after another under `policy`.
    ///
    /// With [`BatchPolicy::Abort`] the first failure is returned; artifacts
    /// written before it stay on disk.
    pub async fn run_batch(
        &self,
        units: Vec<SourceUnit>,
        policy: BatchPolicy,
    ) -> PipelineResult<BatchSummary> {
        let total = units.len();
        let mut summary = BatchSummary::default();

        for (idx, unit) in units.into_iter().enumerate() {
            log_progress!(idx + 1, total, "files");
            let result = self.process_one(&unit.identifier, &unit.content).await;
            record(&mut summary, unit.identifier, result, policy)?;
        }

        Ok(summary)
    }

    /// Like [`Codesystem::run_batch`], reading each file only when its turn comes.
    ///
    /// Unreadable and empty files are skipped whatever the policy and listed
    /// in [`BatchSummary::skipped`]. An abort leaves later files unread.
    pub async fn run_files(
        &self,
        files: Vec<SourceFile>,
        policy: BatchPolicy,
    ) -> PipelineResult<BatchSummary> {
        let total = files.len();
        let mut summary = BatchSummary::default();

        for (idx, file) in files.into_iter().enumerate() {
            log_progress!(idx + 1, total, "files");

            let unit = match file.load().await {
                Ok(Some(unit)) => unit,
                Ok(None) => {
                    log_source_skipped!(file.label, "empty file");
                    summary.skipped.push(file.label);
                    continue;
                }
                Err(e) if e.is_skippable_read() => {
                    log_warning!("Could not read {}: {}", file.label, e);
                    log_source_skipped!(file.label, e);
                    summary.skipped.push(file.label);
                    continue;
                }
                Err(e) => return Err(e),
            };

            let result = self.process_one(&unit.identifier, &unit.content).await;
            record(&mut summary, unit.identifier, result, policy)?;
        }

        Ok(summary)
    }
}

/// Fold one unit's result into `summary`, or stop the batch under `Abort`
fn record(
    summary: &mut BatchSummary,
    identifier: String,
    result: PipelineResult<PathBuf>,
    policy: BatchPolicy,
) -> PipelineResult<()> {
    match result {
        Ok(path) => summary.artifacts.push(path),
        Err(e) => match policy {
            BatchPolicy::Abort => return Err(e),
            BatchPolicy::Skip => {
                log_warning!("Skipping {}: {}", identifier, e);
                log_source_skipped!(identifier, e);
                summary.failed.push((identifier, e.to_string()));
            }
        },
    }
    Ok(())
}

/// Pick the worker implementation requested by the config
pub fn worker_factory(config: &WorkflowConfig) -> Box<dyn WorkerFactory> {
    match config.worker_kind {
        WorkerKind::Claude => Box::new(ClaudeAgentWorker::factory(ClaudeSettings {
            max_turns: config.max_turns,
        })),
        WorkerKind::Stub => Box::new(StubWorker::factory(StubJournal::default(), None)),
    }
}

/// Run the complete workflow with the configured worker implementation
pub async fn run_workflow(config: &WorkflowConfig) -> Result<BatchSummary> {
    let factory = worker_factory(config);
    run_workflow_with(config, factory.as_ref()).await
}

/// Run the complete workflow with an explicit worker factory
///
/// - a single file is read and processed; a read failure is fatal
/// - a directory is walked and processed as a batch
/// - a repository URL is cloned into a temporary directory, then walked
pub async fn run_workflow_with(
    config: &WorkflowConfig,
    factory: &dyn WorkerFactory,
) -> Result<BatchSummary> {
    if config.input.trim().is_empty() {
        bail!("No input given: pass a file path, directory or repository URL");
    }

    let definitions = load_definitions(&config.config_dir)
        .await
        .with_context(|| format!("Failed to load definitions from {}", config.config_dir.display()))?;
    let system = Codesystem::new(&definitions, factory, config)?;
    log_info!(
        "Loaded {} agents and {} tasks",
        system.registry().len(),
        system.plan().len()
    );

    match InputKind::classify(&config.input) {
        InputKind::File(path) => {
            let content = read_code_file(Path::new(&path)).await?;
            let artifact = system.process_one(&path, &content).await?;
            Ok(BatchSummary {
                artifacts: vec![artifact],
                ..Default::default()
            })
        }
        InputKind::Directory(dir) => run_tree(&system, Path::new(&dir), config).await,
        InputKind::Remote(url) => {
            let repository = clone_repository(&url).await?;
            let summary = run_tree(&system, repository.path(), config)
                .await
                .with_context(|| format!("Failed while analyzing {}", repository.url()))?;
            Ok(summary)
        }
    }
}

async fn run_tree(system: &Codesystem, root: &Path, config: &WorkflowConfig) -> Result<BatchSummary> {
    let files = collect_sources(root, &config.extensions).await?;
    log_found!(files.len(), "source files");

    Ok(system.run_files(files, config.batch_policy).await?)
}
