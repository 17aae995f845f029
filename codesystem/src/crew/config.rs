//! Loading agent and task definitions from YAML
//!
//! `agents.yaml` and `tasks.yaml` are top-level mappings keyed by name. The
//! mapping order in the file is the declaration order used by the graph builder.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

use crate::crew::types::{AgentDefinition, TaskDefinition};
use crate::error::{PipelineError, PipelineResult};

pub const AGENTS_FILE: &str = "agents.yaml";
pub const TASKS_FILE: &str = "tasks.yaml";

/// Both definition mappings, already typed and validated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions {
    pub agents: Vec<AgentDefinition>,
    pub tasks: Vec<TaskDefinition>,
}

#[derive(Debug, Deserialize)]
struct RawAgent {
    role: Option<String>,
    goal: Option<String>,
    backstory: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTask {
    description: Option<String>,
    expected_output: Option<String>,
    agent: Option<String>,
    #[serde(default)]
    dependencies: Option<Vec<String>>,
}

/// Load `agents.yaml` and `tasks.yaml` from a config directory
pub async fn load_definitions(config_dir: &Path) -> PipelineResult<Definitions> {
    let agents_yaml = read_config_file(&config_dir.join(AGENTS_FILE)).await?;
    let tasks_yaml = read_config_file(&config_dir.join(TASKS_FILE)).await?;

    Ok(Definitions {
        agents: parse_agents(&agents_yaml, AGENTS_FILE)?,
        tasks: parse_tasks(&tasks_yaml, TASKS_FILE)?,
    })
}

async fn read_config_file(path: &Path) -> PipelineResult<String> {
    fs::read_to_string(path).await.map_err(|e| {
        PipelineError::config(format!("Error loading {}: {}", path.display(), e))
    })
}

/// Parse an agents mapping, preserving declaration order
pub fn parse_agents(yaml: &str, origin: &str) -> PipelineResult<Vec<AgentDefinition>> {
    entries::<RawAgent>(yaml, origin)?
        .into_iter()
        .map(|(name, raw)| {
            Ok(AgentDefinition {
                role: required(raw.role, "role", origin, &name)?,
                goal: required(raw.goal, "goal", origin, &name)?,
                backstory: required(raw.backstory, "backstory", origin, &name)?,
                name,
            })
        })
        .collect()
}

/// Parse a tasks mapping, preserving declaration order
pub fn parse_tasks(yaml: &str, origin: &str) -> PipelineResult<Vec<TaskDefinition>> {
    entries::<RawTask>(yaml, origin)?
        .into_iter()
        .map(|(name, raw)| {
            let description = required(raw.description, "description", origin, &name)?;
            let agent_name = required(raw.agent, "agent", origin, &name)?;
            let mut task = TaskDefinition::new(name, description, agent_name)
                .with_dependencies(raw.dependencies.unwrap_or_default());
            if let Some(hint) = raw.expected_output.filter(|s| !s.trim().is_empty()) {
                task = task.with_expected_output(hint);
            }
            Ok(task)
        })
        .collect()
}

/// Split a top-level YAML mapping into `(name, value)` pairs in file order
fn entries<T: for<'de> Deserialize<'de>>(
    yaml: &str,
    origin: &str,
) -> PipelineResult<Vec<(String, T)>> {
    let document: serde_yaml::Value = serde_yaml::from_str(yaml)
        .map_err(|e| PipelineError::config(format!("{}: YAML parsing error: {}", origin, e)))?;

    let mapping = match document {
        serde_yaml::Value::Mapping(mapping) => mapping,
        serde_yaml::Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(PipelineError::config(format!(
                "{}: expected a mapping of names to definitions",
                origin
            )))
        }
    };

    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let name = key
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| PipelineError::config(format!("{}: entry names must be strings", origin)))?;

        if !seen.insert(name.clone()) {
            return Err(PipelineError::config(format!(
                "{}: duplicate entry '{}'",
                origin, name
            )));
        }

        let parsed = serde_yaml::from_value::<T>(value).map_err(|e| {
            PipelineError::config(format!("{}: invalid entry '{}': {}", origin, name, e))
        })?;
        result.push((name, parsed));
    }

    Ok(result)
}

fn required(value: Option<String>, field: &str, origin: &str, name: &str) -> PipelineResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(PipelineError::config(format!(
            "{}: entry '{}' is missing required field '{}'",
            origin, name, field
        ))),
    }
}
