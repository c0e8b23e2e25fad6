// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run-time state: a `PipelineRun` and the `StepResult`s it accumulates as
//! the engine executes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

crate::define_id! {
    /// Unique identifier for one pipeline execution.
    pub struct RunId;
}

/// Overall status of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    /// Transient: only observed from within a breakpoint handler.
    Paused,
    Success,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Success | RunStatus::Failed | RunStatus::Cancelled
        )
    }
}

/// Status of a single step's execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Skipped,
    Running,
    Success,
    Failed,
}

/// Which stream an output line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSource {
    StdOut,
    StdErr,
}

/// One captured line of child process output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputLine {
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub source: OutputSource,
}

/// A file selected by a step's artifact glob patterns after it completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub path: PathBuf,
    pub step_name: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

/// Number of trailing stderr lines surfaced in a failure summary by default.
pub const DEFAULT_ERROR_TAIL_LINES: usize = 10;

/// The outcome of executing one [`PipelineStep`](crate::pipeline::PipelineStep).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_name: String,
    pub stage_name: String,
    pub resolved_command: String,
    pub status: StepStatus,
    /// -1 until the process completes.
    pub exit_code: i32,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub stdout: Vec<OutputLine>,
    pub stderr: Vec<OutputLine>,
    pub environment: BTreeMap<String, String>,
    pub artifacts: Vec<PathBuf>,
    pub error_message: Option<String>,
    pub hints: Vec<String>,
}

impl StepResult {
    pub fn new(step_name: impl Into<String>, stage_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            step_name: step_name.into(),
            stage_name: stage_name.into(),
            resolved_command: String::new(),
            status: StepStatus::Pending,
            exit_code: -1,
            started_at: now,
            completed_at: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
            environment: BTreeMap::new(),
            artifacts: Vec::new(),
            error_message: None,
            hints: Vec::new(),
        }
    }

    /// Both output streams, interleaved in chronological order.
    pub fn combined_output(&self) -> Vec<&OutputLine> {
        let mut lines: Vec<&OutputLine> = self.stdout.iter().chain(self.stderr.iter()).collect();
        lines.sort_by_key(|l| l.timestamp);
        lines
    }

    /// The last `n` stderr lines, in order.
    pub fn last_stderr_lines(&self, n: usize) -> Vec<&OutputLine> {
        let start = self.stderr.len().saturating_sub(n);
        self.stderr[start..].iter().collect()
    }

    /// A non-empty summary only when the step has actually failed.
    pub fn error_summary(&self) -> Option<String> {
        if self.status != StepStatus::Failed {
            return None;
        }
        self.error_message.clone().or_else(|| {
            Some(format!(
                "step {} failed with exit code {}",
                self.step_name, self.exit_code
            ))
        })
    }
}

/// One pipeline execution: the run's variables, accumulated step results and
/// gathered artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub id: RunId,
    pub pipeline_name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub trigger_reason: Option<String>,
    pub variables: BTreeMap<String, String>,
    pub step_results: Vec<StepResult>,
    pub artifacts: Vec<ArtifactInfo>,
}

impl PipelineRun {
    pub fn new(id: RunId, pipeline_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            pipeline_name: pipeline_name.into(),
            started_at: now,
            completed_at: None,
            status: RunStatus::Pending,
            trigger_reason: None,
            variables: BTreeMap::new(),
            step_results: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    /// Elapsed time since start: up to completion, or up to `now` if still running.
    pub fn elapsed(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.completed_at.unwrap_or(now) - self.started_at
    }

    pub fn last_running_step(&self) -> Option<&StepResult> {
        self.step_results
            .iter()
            .rev()
            .find(|r| r.status == StepStatus::Running)
    }

    pub fn last_completed_step(&self) -> Option<&StepResult> {
        self.step_results
            .iter()
            .rev()
            .find(|r| matches!(r.status, StepStatus::Success | StepStatus::Failed))
    }

    pub fn success_count(&self) -> usize {
        self.step_results
            .iter()
            .filter(|r| r.status == StepStatus::Success)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.step_results
            .iter()
            .filter(|r| r.status == StepStatus::Failed)
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.step_results
            .iter()
            .filter(|r| r.status == StepStatus::Skipped)
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    /// A read-only summary for reporting (CLI end-of-run output).
    pub fn summary(&self, now: DateTime<Utc>) -> RunSummary {
        RunSummary {
            pipeline_name: self.pipeline_name.clone(),
            status: self.status,
            elapsed: self.elapsed(now),
            success_count: self.success_count(),
            failed_count: self.failed_count(),
            skipped_count: self.skipped_count(),
        }
    }
}

/// Compact, derived view of a run for end-of-run reporting.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub pipeline_name: String,
    pub status: RunStatus,
    pub elapsed: chrono::Duration,
    pub success_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
