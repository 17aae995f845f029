//! Sequential execution of a plan against one run context

use anyhow::Result;
use std::future::Future;

use codesystem_sdk::{
    log_agent_complete, log_agent_failed, log_agent_start, log_task_complete, log_task_failed,
    log_task_start,
};

use crate::crew::graph::{ExecutionPlan, ExecutionUnit};
use crate::crew::template::interpolate;
use crate::crew::types::{AggregateResult, RunContext, TaskOutput, TaskOutputs};
use crate::error::{PipelineError, PipelineResult};
use crate::worker::WorkerRequest;

/// Position of a task within the plan (1-indexed for display)
#[derive(Debug, Clone, Copy)]
pub struct TaskContext {
    pub task_number: usize,
    pub total_tasks: usize,
}

/// Everything a finished run produced
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub aggregate: AggregateResult,
    pub outputs: TaskOutputs,
    /// Context as it stood after the last task
    pub context: RunContext,
}

/// Execute a single task with automatic logging
///
/// Wraps task execution with:
/// - `log_task_start` before execution
/// - `log_task_complete` on success
/// - `log_task_failed` on error
pub async fn execute_task<F, Fut, R>(
    task_id: &str,
    description: &str,
    ctx: TaskContext,
    executor: F,
) -> Result<R>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(R, String)>>,
{
    log_task_start!(task_id, description, ctx.task_number, ctx.total_tasks);

    match executor().await {
        Ok((result, summary)) => {
            log_task_complete!(task_id, summary);
            Ok(result)
        }
        Err(e) => {
            log_task_failed!(task_id, e.to_string());
            Err(e)
        }
    }
}

/// Run every unit of `plan` in order, threading outputs through `context`.
///
/// The first worker failure aborts the run with [`PipelineError::WorkerInvocation`].
pub async fn run_plan(plan: &ExecutionPlan, mut context: RunContext) -> PipelineResult<RunOutcome> {
    let total = plan.len();
    let mut outputs = TaskOutputs::default();

    for (idx, unit) in plan.units().iter().enumerate() {
        let ctx = TaskContext {
            task_number: idx + 1,
            total_tasks: total,
        };
        let request = build_request(unit, &context, &outputs);

        let preview = description_preview(&unit.task.description);
        let text = execute_task(unit.name(), &preview, ctx, || async {
            let text = invoke_unit(unit, &request).await?;
            let summary = format!("{} chars", text.chars().count());
            Ok((text, summary))
        })
        .await
        .map_err(|e| PipelineError::WorkerInvocation {
            task: unit.name().to_string(),
            message: format!("{:#}", e),
        })?;

        context.set_output(unit.name(), text.clone());
        outputs.insert(unit.name(), text);
    }

    let aggregate = outputs
        .last()
        .map(|last| AggregateResult {
            terminal_task: Some(last.task_name.clone()),
            text: last.text.clone(),
        })
        .unwrap_or_default();

    Ok(RunOutcome {
        aggregate,
        outputs,
        context,
    })
}

/// Longest task description carried by a start event
pub const PREVIEW_CHARS: usize = 120;

/// Uninterpolated template, cut to [`PREVIEW_CHARS`]. Events never carry the
/// source text substituted into a description.
pub fn description_preview(template: &str) -> String {
    let flat = template.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    cut.push('…');
    cut
}

fn build_request(unit: &ExecutionUnit, context: &RunContext, outputs: &TaskOutputs) -> WorkerRequest {
    let dependency_context = unit
        .dependencies
        .iter()
        .filter_map(|dep| {
            outputs.get(dep.name()).map(|text| TaskOutput {
                task_name: dep.name().to_string(),
                text: text.to_string(),
            })
        })
        .collect();

    WorkerRequest {
        task_name: unit.name().to_string(),
        description: interpolate(&unit.task.description, context),
        expected_output: unit
            .task
            .expected_output
            .as_deref()
            .map(|hint| interpolate(hint, context)),
        context: dependency_context,
    }
}

async fn invoke_unit(unit: &ExecutionUnit, request: &WorkerRequest) -> Result<String> {
    let agent_name = &unit.worker.agent().name;
    log_agent_start!(unit.name(), agent_name, &unit.worker.agent().role);

    match unit.worker.invoke(request).await {
        Ok(text) => {
            log_agent_complete!(unit.name(), agent_name);
            Ok(text)
        }
        Err(e) => {
            log_agent_failed!(unit.name(), agent_name, e.to_string());
            Err(e)
        }
    }
}
