// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The declarative pipeline definition: pipelines, stages, steps, conditions
//! and watch triggers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel pipeline name used when none is supplied.
pub const DEFAULT_PIPELINE_NAME: &str = "Unnamed Pipeline";

/// Schema version understood by this build.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Default stage name when none is supplied.
pub const DEFAULT_STAGE_NAME: &str = "default";

/// Default glob filter for a watch trigger.
pub const DEFAULT_WATCH_FILTER: &str = "*.*";

/// Default debounce, in milliseconds, for a watch trigger.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Default per-step timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u32 = 300;

/// Built-in variables the engine injects at run start; these satisfy
/// variable references even though they are never declared in the
/// pipeline's own `variables` map.
pub const BUILTIN_VARIABLES: &[&str] = &[
    "PIPEFORGE_WORK_DIR",
    "PIPEFORGE_RUN_ID",
    "PIPEFORGE_PIPELINE",
];

/// When, relative to step execution, a debug breakpoint observer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakpointMode {
    /// Never pause for this step unless the whole run is interactive.
    #[default]
    Never,
    /// Always pause before this step executes.
    Always,
    /// Pause only after this step has failed, as a retry/abort gate.
    OnFailure,
}

/// A condition gating whether a stage runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCondition {
    /// Only run the stage if this variable is declared and non-empty.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub only_if: Option<String>,
    /// Skip the stage if this variable is declared and non-empty.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub not_if: Option<String>,
    /// Every listed path must exist for the stage to run.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub requires_files: Vec<String>,
}

/// A condition gating whether a step runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepCondition {
    /// Only run the step if this variable is declared and non-empty.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub only_if: Option<String>,
    /// Skip the step if this variable is declared and non-empty.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub not_if: Option<String>,
    /// Require the exit code of the prior step to match this value.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub requires_exit_code: Option<i32>,
}

/// A single executable step within a stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStep {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub arguments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub working_directory: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub environment: BTreeMap<String, String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u32,
    #[serde(default)]
    pub allow_failure: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub artifacts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub condition: Option<StepCondition>,
    #[serde(default)]
    pub breakpoint: BreakpointMode,
}

fn default_timeout_seconds() -> u32 {
    DEFAULT_TIMEOUT_SECONDS
}

impl PipelineStep {
    /// An always-valid step skeleton for programmatic construction; callers
    /// fill in `command` before the step is usable.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            command: command.into(),
            arguments: None,
            working_directory: None,
            environment: BTreeMap::new(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            allow_failure: false,
            artifacts: Vec::new(),
            condition: None,
            breakpoint: BreakpointMode::Never,
        }
    }
}

/// An ordered group of steps sharing a condition and failure policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStage {
    #[serde(default = "default_stage_name")]
    pub name: String,
    pub steps: Vec<PipelineStep>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub condition: Option<StageCondition>,
    #[serde(default)]
    pub continue_on_error: bool,
}

fn default_stage_name() -> String {
    DEFAULT_STAGE_NAME.to_string()
}

impl PipelineStage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
            condition: None,
            continue_on_error: false,
        }
    }

    pub fn is_default_name(&self) -> bool {
        self.name == DEFAULT_STAGE_NAME
    }
}

/// A filesystem location/filter whose debounced changes re-trigger a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchTrigger {
    #[serde(default = "default_watch_path")]
    pub path: String,
    #[serde(default = "default_watch_filter")]
    pub filter: String,
    #[serde(default)]
    pub include_subdirectories: bool,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stage: Option<String>,
}

fn default_watch_path() -> String {
    ".".to_string()
}

fn default_watch_filter() -> String {
    DEFAULT_WATCH_FILTER.to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for WatchTrigger {
    fn default() -> Self {
        Self {
            path: default_watch_path(),
            filter: default_watch_filter(),
            include_subdirectories: false,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            stage: None,
        }
    }
}

/// The top-level, immutable-during-a-run pipeline definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDefinition {
    #[serde(default = "default_pipeline_name")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    /// 0 means unspecified. Current schema is [`CURRENT_SCHEMA_VERSION`].
    #[serde(default)]
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub working_directory: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub variables: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub watch: Vec<WatchTrigger>,
    #[serde(default)]
    pub stages: Vec<PipelineStage>,
}

fn default_pipeline_name() -> String {
    DEFAULT_PIPELINE_NAME.to_string()
}

impl Default for PipelineDefinition {
    fn default() -> Self {
        Self {
            name: default_pipeline_name(),
            description: None,
            version: 0,
            working_directory: None,
            variables: BTreeMap::new(),
            watch: Vec::new(),
            stages: Vec::new(),
        }
    }
}

impl PipelineDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Total number of steps across every stage, in execution order.
    pub fn total_steps(&self) -> usize {
        self.stages.iter().map(|s| s.steps.len()).sum()
    }

    pub fn has_default_name(&self) -> bool {
        self.name.is_empty() || self.name == DEFAULT_PIPELINE_NAME
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
