//! Worker capability: invoke a role-bound agent with a task and get text back
//!
//! - **stub**: deterministic worker for tests and dry runs
//! - **claude**: worker backed by a Claude agent session

pub mod claude;
pub mod stub;

pub use claude::{ClaudeAgentWorker, ClaudeSettings};
pub use stub::{RecordedCall, StubJournal, StubWorker};

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::crew::types::{AgentDefinition, TaskOutput};

/// Everything a worker receives for one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRequest {
    pub task_name: String,
    /// Description with run-context fields already substituted
    pub description: String,
    pub expected_output: Option<String>,
    /// Outputs of the task's resolved dependencies, in dependency order
    pub context: Vec<TaskOutput>,
}

impl WorkerRequest {
    /// Identity of the agent, sent as the system prompt
    pub fn system_prompt(agent: &AgentDefinition) -> String {
        format!(
            "You are {}.\n{}\n\nYour personal goal is: {}",
            agent.role, agent.backstory, agent.goal
        )
    }

    /// Task, expected output and dependency context, sent as the user prompt
    pub fn user_prompt(&self) -> String {
        let mut prompt = format!("# Task\n{}\n", self.description);

        if let Some(expected) = &self.expected_output {
            prompt.push_str(&format!("\n# Expected Output\n{}\n", expected));
        }

        if !self.context.is_empty() {
            prompt.push_str("\n# Context\n");
            for dep in &self.context {
                prompt.push_str(&format!("\n## {}\n{}\n", dep.task_name, dep.text));
            }
        }

        prompt
    }
}

/// A runtime instance bound to one agent definition
#[async_trait]
pub trait Worker: Send + Sync {
    fn agent(&self) -> &AgentDefinition;

    async fn invoke(&self, request: &WorkerRequest) -> Result<String>;
}

/// Builds one worker per agent definition
pub trait WorkerFactory: Send + Sync {
    fn create(&self, agent: &AgentDefinition) -> Arc<dyn Worker>;
}

impl<F> WorkerFactory for F
where
    F: Fn(&AgentDefinition) -> Arc<dyn Worker> + Send + Sync,
{
    fn create(&self, agent: &AgentDefinition) -> Arc<dyn Worker> {
        self(agent)
    }
}
