//! Data structures for agent/task definitions and per-run state

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Input field holding the source text under analysis
pub const CODE_TO_ANALYZE: &str = "code_to_analyze";
/// Input field holding the source identifier
pub const FILE_NAME: &str = "file_name";

/// Output slots every run starts with, pre-filled with an empty placeholder
pub const OUTPUT_FIELDS: [&str; 6] = [
    "code_analysis_output",
    "security_analysis_output",
    "performance_analysis_output",
    "code_test_output",
    "best_practices_output",
    "final_report_task",
];

/// A role a worker plays, as declared in `agents.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub name: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

/// A unit of work, as declared in `tasks.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub name: String,
    pub description: String,
    pub expected_output: Option<String>,
    pub agent_name: String,
    #[serde(default)]
    pub dependency_names: Vec<String>,
}

impl TaskDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        agent_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            expected_output: None,
            agent_name: agent_name.into(),
            dependency_names: Vec::new(),
        }
    }

    pub fn with_expected_output(mut self, expected_output: impl Into<String>) -> Self {
        self.expected_output = Some(expected_output.into());
        self
    }

    pub fn with_dependencies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependency_names = names.into_iter().map(Into::into).collect();
        self
    }
}

/// Shared input/output bag for one pipeline run
///
/// The field set is fixed at construction; later writes only overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    fields: BTreeMap<String, String>,
}

impl RunContext {
    pub fn new(file_name: impl Into<String>, code: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(CODE_TO_ANALYZE.to_string(), code.into());
        fields.insert(FILE_NAME.to_string(), file_name.into());
        for field in OUTPUT_FIELDS {
            fields.insert(field.to_string(), String::new());
        }
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn file_name(&self) -> &str {
        self.get(FILE_NAME).unwrap_or_default()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Overwrite an existing field. Returns `false` for unknown fields.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
        match self.fields.get_mut(field) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Store a task result. Only the fixed output fields accept writes, so a
    /// task can never replace the source text or its identifier.
    pub fn set_output(&mut self, field: &str, value: impl Into<String>) -> bool {
        OUTPUT_FIELDS.contains(&field) && self.set(field, value)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new("", "")
    }
}

/// Text produced by one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub task_name: String,
    pub text: String,
}

/// Outputs of a run, in execution order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskOutputs {
    entries: Vec<TaskOutput>,
}

impl TaskOutputs {
    pub fn insert(&mut self, task_name: impl Into<String>, text: impl Into<String>) {
        let task_name = task_name.into();
        let text = text.into();
        match self.entries.iter_mut().find(|e| e.task_name == task_name) {
            Some(existing) => existing.text = text,
            None => self.entries.push(TaskOutput { task_name, text }),
        }
    }

    pub fn get(&self, task_name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.task_name == task_name)
            .map(|e| e.text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskOutput> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&TaskOutput> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|e| (e.task_name.clone(), e.text.clone()))
            .collect()
    }
}

/// Final combined text of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateResult {
    /// Task whose output became the aggregate, if any task ran
    pub terminal_task: Option<String>,
    pub text: String,
}

impl AggregateResult {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
