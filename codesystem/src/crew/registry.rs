//! Worker registry: one addressable worker per agent definition

use std::collections::HashMap;
use std::sync::Arc;

use crate::crew::types::AgentDefinition;
use crate::error::{PipelineError, PipelineResult};
use crate::worker::{Worker, WorkerFactory};

/// Workers addressable by agent name. Read-only once built.
#[derive(Clone, Default)]
pub struct WorkerRegistry {
    workers: HashMap<String, Arc<dyn Worker>>,
    order: Vec<String>,
}

impl WorkerRegistry {
    /// Instantiate exactly one worker per agent definition
    pub fn build(
        agents: &[AgentDefinition],
        factory: &dyn WorkerFactory,
    ) -> PipelineResult<Self> {
        let mut registry = Self::default();

        for agent in agents {
            for (field, value) in [
                ("role", &agent.role),
                ("goal", &agent.goal),
                ("backstory", &agent.backstory),
            ] {
                if value.trim().is_empty() {
                    return Err(PipelineError::config(format!(
                        "agent '{}' is missing required field '{}'",
                        agent.name, field
                    )));
                }
            }

            if registry.workers.contains_key(&agent.name) {
                return Err(PipelineError::config(format!(
                    "agent '{}' is defined more than once",
                    agent.name
                )));
            }

            registry
                .workers
                .insert(agent.name.clone(), factory.create(agent));
            registry.order.push(agent.name.clone());
        }

        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Worker>> {
        self.workers.get(name).cloned()
    }

    /// Agent names in declaration order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

impl std::fmt::Debug for WorkerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerRegistry")
            .field("agents", &self.order)
            .finish()
    }
}
