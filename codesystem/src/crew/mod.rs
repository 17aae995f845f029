//! Crew assembly and execution
//!
//! - **config**: typed agent/task definitions loaded from YAML
//! - **registry**: one worker per agent definition
//! - **graph**: dependency resolution into an ordered execution plan
//! - **template**: `{field}` substitution in task descriptions
//! - **executor**: sequential plan execution with task/agent logging

pub mod config;
pub mod executor;
pub mod graph;
pub mod registry;
pub mod template;
pub mod types;

pub use config::{load_definitions, parse_agents, parse_tasks, Definitions};
pub use executor::{execute_task, run_plan, RunOutcome, TaskContext};
pub use graph::{build_plan, DependencyMode, ExecutionPlan, ExecutionUnit};
pub use registry::WorkerRegistry;
pub use template::interpolate;
pub use types::{
    AgentDefinition, AggregateResult, RunContext, TaskDefinition, TaskOutput, TaskOutputs,
    OUTPUT_FIELDS,
};
