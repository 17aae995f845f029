//! Deterministic worker that echoes the task name

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{Worker, WorkerFactory, WorkerRequest};
use crate::crew::types::AgentDefinition;

/// One invocation seen by a stub worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub agent_name: String,
    pub request: WorkerRequest,
}

/// Invocation log shared by every stub built from the same factory
#[derive(Debug, Clone, Default)]
pub struct StubJournal {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl StubJournal {
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_for(&self, task_name: &str) -> Option<RecordedCall> {
        self.calls().into_iter().find(|c| c.request.task_name == task_name)
    }

    pub fn len(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record(&self, call: RecordedCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

/// Returns `"<task_name>-output"` for every request
#[derive(Debug, Clone)]
pub struct StubWorker {
    agent: AgentDefinition,
    journal: StubJournal,
    fail_marker: Option<String>,
}

impl StubWorker {
    pub fn new(agent: AgentDefinition, journal: StubJournal) -> Self {
        Self {
            agent,
            journal,
            fail_marker: None,
        }
    }

    /// Fail any request whose description contains `marker`
    pub fn failing_on(mut self, marker: impl Into<String>) -> Self {
        self.fail_marker = Some(marker.into());
        self
    }

    /// Factory producing stubs that share `journal`
    pub fn factory(journal: StubJournal, fail_marker: Option<String>) -> impl WorkerFactory {
        move |agent: &AgentDefinition| -> Arc<dyn Worker> {
            let worker = StubWorker::new(agent.clone(), journal.clone());
            match &fail_marker {
                Some(marker) => Arc::new(worker.failing_on(marker.clone())),
                None => Arc::new(worker),
            }
        }
    }
}

#[async_trait]
impl Worker for StubWorker {
    fn agent(&self) -> &AgentDefinition {
        &self.agent
    }

    async fn invoke(&self, request: &WorkerRequest) -> Result<String> {
        self.journal.record(RecordedCall {
            agent_name: self.agent.name.clone(),
            request: request.clone(),
        });

        if let Some(marker) = &self.fail_marker {
            if request.description.contains(marker.as_str()) {
                bail!("stub worker refused input containing '{}'", marker);
            }
        }

        Ok(format!("{}-output", request.task_name))
    }
}
