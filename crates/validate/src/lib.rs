// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static semantic analysis of a loaded [`PipelineDefinition`]. Pure and
//! side-effect-free: callers decide how to report or log the result.

#![cfg_attr(test, allow(clippy::unwrap_used))]

use pipeforge_core::pipeline::{BUILTIN_VARIABLES, CURRENT_SCHEMA_VERSION, DEFAULT_PIPELINE_NAME};
use pipeforge_core::vars;
use pipeforge_core::PipelineDefinition;
use std::collections::HashSet;
use std::fmt;

/// Severity of a single validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Where in the pipeline a validation message applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Pipeline,
    Watch(usize),
    Stage(String),
    Step { stage: String, step: String },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Pipeline => write!(f, "pipeline"),
            Location::Watch(i) => write!(f, "watch[{i}]"),
            Location::Stage(name) => write!(f, "stage '{name}'"),
            Location::Step { stage, step } => write!(f, "stage '{stage}' step '{step}'"),
        }
    }
}

/// One (severity, location, message) validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    pub severity: Severity,
    pub location: Location,
    pub message: String,
}

/// The full set of findings for one validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub messages: Vec<ValidationMessage>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.severity == Severity::Error)
    }

    fn error(&mut self, location: Location, message: impl Into<String>) {
        self.messages.push(ValidationMessage {
            severity: Severity::Error,
            location,
            message: message.into(),
        });
    }

    fn warning(&mut self, location: Location, message: impl Into<String>) {
        self.messages.push(ValidationMessage {
            severity: Severity::Warning,
            location,
            message: message.into(),
        });
    }
}

/// Validate a loaded pipeline definition per the rules in the data model's
/// specification. Always returns a result; errors and warnings are carried
/// as messages, never as a `Result::Err`.
pub fn validate(definition: &PipelineDefinition) -> ValidationResult {
    let mut result = ValidationResult::default();

    validate_schema_version(definition, &mut result);
    validate_pipeline_name(definition, &mut result);

    if definition.stages.is_empty() {
        result.error(Location::Pipeline, "pipeline has zero stages");
    }

    for (i, trigger) in definition.watch.iter().enumerate() {
        if trigger.path.trim().is_empty() {
            result.error(Location::Watch(i), "watch trigger path is empty");
        }
        // debounce_ms is unsigned in the data model; a negative value can
        // only arrive through a custom deserializer, but the rule is kept
        // here so the validator document and the data model agree in word.
    }

    let declared: HashSet<&str> = definition.variables.keys().map(String::as_str).collect();
    let mut seen_stage_names: HashSet<&str> = HashSet::new();

    for stage in &definition.stages {
        if seen_stage_names.contains(stage.name.as_str()) {
            result.error(
                Location::Pipeline,
                format!("Duplicate stage name: '{}'", stage.name),
            );
        }
        seen_stage_names.insert(stage.name.as_str());

        validate_stage(stage, &declared, &mut result);
    }

    result
}

fn validate_schema_version(definition: &PipelineDefinition, result: &mut ValidationResult) {
    match definition.version {
        0 => result.warning(Location::Pipeline, "pipeline has no schema version"),
        v if v > CURRENT_SCHEMA_VERSION => result.warning(
            Location::Pipeline,
            format!("schema version {v} is newer than supported ({CURRENT_SCHEMA_VERSION})"),
        ),
        v if v < CURRENT_SCHEMA_VERSION => result.warning(
            Location::Pipeline,
            format!("schema version {v} is older than current ({CURRENT_SCHEMA_VERSION})"),
        ),
        _ => {}
    }
}

fn validate_pipeline_name(definition: &PipelineDefinition, result: &mut ValidationResult) {
    if definition.name.trim().is_empty() || definition.name == DEFAULT_PIPELINE_NAME {
        result.warning(Location::Pipeline, "pipeline has no name");
    }
}

fn validate_stage(
    stage: &pipeforge_core::PipelineStage,
    declared: &HashSet<&str>,
    result: &mut ValidationResult,
) {
    let loc = Location::Stage(stage.name.clone());

    if stage.is_default_name() {
        result.warning(loc.clone(), "stage uses the default name");
    }

    if stage.steps.is_empty() {
        result.error(loc.clone(), "stage has zero steps");
    }

    if let Some(cond) = &stage.condition {
        if let Some(var) = &cond.only_if {
            check_variable_declared(var, declared, &loc, result);
        }
        if let Some(var) = &cond.not_if {
            check_variable_declared(var, declared, &loc, result);
        }
    }

    let mut seen_step_names: HashSet<&str> = HashSet::new();
    for step in &stage.steps {
        if seen_step_names.contains(step.name.as_str()) {
            result.warning(
                loc.clone(),
                format!("duplicate step name '{}' within stage", step.name),
            );
        }
        seen_step_names.insert(step.name.as_str());

        validate_step(stage, step, declared, result);
    }
}

fn validate_step(
    stage: &pipeforge_core::PipelineStage,
    step: &pipeforge_core::PipelineStep,
    declared: &HashSet<&str>,
    result: &mut ValidationResult,
) {
    let loc = Location::Step {
        stage: stage.name.clone(),
        step: step.name.clone(),
    };

    if step.command.trim().is_empty() {
        result.error(loc.clone(), "step command is empty");
    }

    if step.timeout_seconds == 0 {
        result.error(loc.clone(), "step timeout must be positive");
    }

    let mut text = step.command.clone();
    if let Some(args) = &step.arguments {
        text.push(' ');
        text.push_str(args);
    }
    for reference in vars::find_references(&text) {
        check_variable_declared(reference, declared, &loc, result);
    }
}

fn check_variable_declared(
    name: &str,
    declared: &HashSet<&str>,
    loc: &Location,
    result: &mut ValidationResult,
) {
    if declared.contains(name) || BUILTIN_VARIABLES.contains(&name) {
        return;
    }
    result.warning(loc.clone(), format!("undeclared variable '{name}'"));
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
