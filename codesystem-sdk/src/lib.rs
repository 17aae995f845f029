//! Run events and console logging shared by codesystem pipelines.
//!
//! Two channels are provided:
//! - [`WorkflowLog`] events, serialized as JSON lines on stderr so a supervising
//!   process can follow a run.
//! - Console macros printing colored, human-readable lines on stdout.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix marking a structured event line on stderr
pub const EVENT_PREFIX: &str = "__WF_EVENT__:";

/// Identifier of one pipeline run (one processed source unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Structured logging events emitted while a pipeline runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowLog {
    /// Pipeline run started for one source unit
    RunStarted {
        run_id: RunId,
        source: String,
        total_tasks: usize,
    },
    /// Pipeline run finished and produced an artifact
    RunCompleted {
        run_id: RunId,
        source: String,
        artifact: String,
    },
    /// Pipeline run aborted
    RunFailed {
        run_id: RunId,
        source: String,
        error: String,
    },
    /// Task started
    TaskStarted {
        task_id: String,
        description: String,
        task_number: usize,
        total_tasks: usize,
    },
    /// Task completed
    TaskCompleted {
        task_id: String,
        result: Option<String>,
    },
    /// Task failed
    TaskFailed {
        task_id: String,
        error: String,
    },
    /// Worker invoked on behalf of a task
    AgentStarted {
        task_id: String,
        agent_name: String,
        description: String,
    },
    /// Worker returned text
    AgentCompleted {
        task_id: String,
        agent_name: String,
        result: Option<String>,
    },
    /// Worker invocation failed
    AgentFailed {
        task_id: String,
        agent_name: String,
        error: String,
    },
    /// Source unit dropped from a batch
    SourceSkipped {
        source: String,
        reason: String,
    },
    /// Report artifact persisted
    ReportWritten {
        source: String,
        file_path: String,
    },
}

impl WorkflowLog {
    /// Serialize this event as a single prefixed JSON line
    pub fn to_line(&self) -> Option<String> {
        serde_json::to_string(self)
            .ok()
            .map(|json| format!("{}{}", EVENT_PREFIX, json))
    }

    /// Parse a line previously produced by [`WorkflowLog::to_line`]
    pub fn from_line(line: &str) -> Option<Self> {
        let json = line.trim().strip_prefix(EVENT_PREFIX)?;
        serde_json::from_str(json).ok()
    }

    /// Emit this log event to stderr
    pub fn emit(&self) {
        if let Some(line) = self.to_line() {
            use std::io::Write;
            eprintln!("{}", line);
            // Force flush stderr so events interleave correctly with worker output
            let _ = std::io::stderr().flush();
        }
    }
}

/// Helper macros for structured events
#[macro_export]
macro_rules! log_run_start {
    ($run_id:expr, $source:expr, $total:expr) => {
        $crate::WorkflowLog::RunStarted {
            run_id: $run_id,
            source: $source.to_string(),
            total_tasks: $total,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_run_complete {
    ($run_id:expr, $source:expr, $artifact:expr) => {
        $crate::WorkflowLog::RunCompleted {
            run_id: $run_id,
            source: $source.to_string(),
            artifact: $artifact.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_run_failed {
    ($run_id:expr, $source:expr, $error:expr) => {
        $crate::WorkflowLog::RunFailed {
            run_id: $run_id,
            source: $source.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_task_start {
    ($task_id:expr, $desc:expr, $number:expr, $total:expr) => {
        $crate::WorkflowLog::TaskStarted {
            task_id: $task_id.to_string(),
            description: $desc.to_string(),
            task_number: $number,
            total_tasks: $total,
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_task_complete {
    ($task_id:expr) => {
        $crate::WorkflowLog::TaskCompleted {
            task_id: $task_id.to_string(),
            result: None,
        }
        .emit();
    };
    ($task_id:expr, $result:expr) => {
        $crate::WorkflowLog::TaskCompleted {
            task_id: $task_id.to_string(),
            result: Some($result.to_string()),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_task_failed {
    ($task_id:expr, $error:expr) => {
        $crate::WorkflowLog::TaskFailed {
            task_id: $task_id.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_agent_start {
    ($task_id:expr, $agent:expr, $desc:expr) => {
        $crate::WorkflowLog::AgentStarted {
            task_id: $task_id.to_string(),
            agent_name: $agent.to_string(),
            description: $desc.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_agent_complete {
    ($task_id:expr, $agent:expr) => {
        $crate::WorkflowLog::AgentCompleted {
            task_id: $task_id.to_string(),
            agent_name: $agent.to_string(),
            result: None,
        }
        .emit();
    };
    ($task_id:expr, $agent:expr, $result:expr) => {
        $crate::WorkflowLog::AgentCompleted {
            task_id: $task_id.to_string(),
            agent_name: $agent.to_string(),
            result: Some($result.to_string()),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_agent_failed {
    ($task_id:expr, $agent:expr, $error:expr) => {
        $crate::WorkflowLog::AgentFailed {
            task_id: $task_id.to_string(),
            agent_name: $agent.to_string(),
            error: $error.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_source_skipped {
    ($source:expr, $reason:expr) => {
        $crate::WorkflowLog::SourceSkipped {
            source: $source.to_string(),
            reason: $reason.to_string(),
        }
        .emit();
    };
}

#[macro_export]
macro_rules! log_report_written {
    ($source:expr, $path:expr) => {
        $crate::WorkflowLog::ReportWritten {
            source: $source.to_string(),
            file_path: $path.to_string(),
        }
        .emit();
    };
}

// ============================================================================
// Console Logging Macros
// ============================================================================
// Colored console output for human-readable logs, complementing the
// structured WorkflowLog events.
// ============================================================================

/// Logs a section header for a processed source unit.
///
/// Outputs:
/// ```text
/// ═══ Processing: src/app.py ═══
/// ```
#[macro_export]
macro_rules! log_section_console {
    ($title:expr, $subject:expr) => {
        println!("\x1b[1;36m═══ {}: {} ═══\x1b[0m", $title, $subject);
    };
}

/// Logs progress of an operation.
///
/// Outputs:
/// ```text
/// Progress: 3/5 tasks
/// ```
#[macro_export]
macro_rules! log_progress {
    ($current:expr, $total:expr, $item_type:expr) => {
        println!(
            "\x1b[36mProgress: {}/{} {}\x1b[0m",
            $current, $total, $item_type
        );
    };
}

/// Logs the number of items found.
///
/// Outputs:
/// ```text
/// Found 14 source files
/// ```
#[macro_export]
macro_rules! log_found {
    ($count:expr, $item_type:expr) => {
        println!("\x1b[36mFound {} {}\x1b[0m", $count, $item_type);
    };
}

/// Logs an informational message.
#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        println!("\x1b[36mℹ {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[36mℹ {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs a warning message.
///
/// Outputs:
/// ```text
/// ⚠ Warning: Could not read src/blob.c
/// ```
#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", $message);
    };
    ($fmt:expr, $($arg:tt)*) => {
        println!("\x1b[33m⚠ Warning: {}\x1b[0m", format!($fmt, $($arg)*));
    };
}

/// Logs that a file has been saved.
#[macro_export]
macro_rules! log_file_saved {
    ($path:expr) => {
        println!("\x1b[32m✓ Saved: {}\x1b[0m", $path);
    };
}
