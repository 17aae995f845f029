//! Worker backed by a Claude agent session
//!
//! Each invocation opens a `claude_agent_sdk::query` stream with the agent's
//! identity as the system prompt and the task as the user prompt. Text blocks
//! of assistant messages are collected until the result message arrives.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use claude_agent_sdk::{query, ClaudeAgentOptions, ContentBlock, Message};
use futures::{Stream, StreamExt};
use std::sync::Arc;

use super::{Worker, WorkerFactory, WorkerRequest};
use crate::crew::types::AgentDefinition;

/// Session limits shared by every agent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaudeSettings {
    /// Upper bound on conversation turns per task; the SDK default when unset
    pub max_turns: Option<u32>,
}

pub struct ClaudeAgentWorker {
    agent: AgentDefinition,
    settings: ClaudeSettings,
}

impl ClaudeAgentWorker {
    pub fn new(agent: AgentDefinition, settings: ClaudeSettings) -> Self {
        Self { agent, settings }
    }

    pub fn factory(settings: ClaudeSettings) -> impl WorkerFactory {
        move |agent: &AgentDefinition| -> Arc<dyn Worker> {
            Arc::new(ClaudeAgentWorker::new(agent.clone(), settings.clone()))
        }
    }

    fn options(&self) -> ClaudeAgentOptions {
        let mut builder =
            ClaudeAgentOptions::builder().system_prompt(WorkerRequest::system_prompt(&self.agent));
        if let Some(max_turns) = self.settings.max_turns {
            builder = builder.max_turns(max_turns);
        }
        builder.build()
    }
}

#[async_trait]
impl Worker for ClaudeAgentWorker {
    fn agent(&self) -> &AgentDefinition {
        &self.agent
    }

    async fn invoke(&self, request: &WorkerRequest) -> Result<String> {
        let prompt = request.user_prompt();
        let stream = query(&prompt, Some(self.options()))
            .await
            .with_context(|| format!("Failed to start a session for agent '{}'", self.agent.name))?;

        collect_text(stream).await
    }
}

/// Concatenate assistant text until the result message
async fn collect_text(
    stream: impl Stream<Item = claude_agent_sdk::error::Result<Message>>,
) -> Result<String> {
    let mut response_text = String::new();
    let mut stream = Box::pin(stream);

    while let Some(message) = stream.next().await {
        match message? {
            Message::Assistant { message, .. } => {
                for block in &message.content {
                    if let ContentBlock::Text { text } = block {
                        response_text.push_str(text);
                    }
                }
            }
            Message::Result { is_error, .. } => {
                if is_error {
                    bail!("agent session ended with an error result");
                }
                break;
            }
            _ => {}
        }
    }

    Ok(response_text.trim().to_string())
}
