use super::*;
use pipeforge_core::{PipelineDefinition, PipelineStage, PipelineStep, StageCondition, WatchTrigger};

fn valid_pipeline() -> PipelineDefinition {
    let mut def = PipelineDefinition::new("Demo");
    def.version = 1;
    let mut stage = PipelineStage::new("build");
    stage.steps.push(PipelineStep::new("compile", "cc"));
    def.stages.push(stage);
    def
}

#[test]
fn valid_pipeline_has_zero_errors() {
    let result = validate(&valid_pipeline());
    assert!(!result.has_errors(), "{:?}", result.messages);
}

#[yare::parameterized(
    zero_version = { 0, Some("no schema version") },
    newer_than_current = { 99, Some("newer") },
    current_version = { pipeforge_core::pipeline::CURRENT_SCHEMA_VERSION, None },
)]
fn schema_version_warnings(version: u32, expected_substring: Option<&str>) {
    let mut def = valid_pipeline();
    def.version = version;
    let result = validate(&def);
    match expected_substring {
        Some(substring) => assert!(result
            .messages
            .iter()
            .any(|m| m.severity == Severity::Warning && m.message.contains(substring))),
        None => assert!(!result
            .messages
            .iter()
            .any(|m| m.message.contains("older") || m.message.contains("newer"))),
    }
}

#[test]
fn zero_stages_is_an_error() {
    let def = PipelineDefinition::new("Demo");
    let result = validate(&def);
    assert!(result.has_errors());
}

#[test]
fn duplicate_stage_names_always_error_with_exact_message_substring() {
    let mut def = valid_pipeline();
    let mut second = PipelineStage::new("build");
    second.steps.push(PipelineStep::new("again", "cc"));
    def.stages.push(second);

    let result = validate(&def);
    assert!(result.has_errors());
    assert!(result
        .messages
        .iter()
        .any(|m| m.message.contains("Duplicate stage name")));
}

#[test]
fn empty_stage_is_an_error() {
    let mut def = valid_pipeline();
    def.stages.push(PipelineStage::new("empty"));
    let result = validate(&def);
    assert!(result.has_errors());
}

#[test]
fn empty_command_is_an_error() {
    let mut def = valid_pipeline();
    def.stages[0].steps.push(PipelineStep::new("broken", ""));
    let result = validate(&def);
    assert!(result.has_errors());
}

#[test]
fn non_positive_timeout_is_an_error() {
    let mut def = valid_pipeline();
    def.stages[0].steps[0].timeout_seconds = 0;
    let result = validate(&def);
    assert!(result.has_errors());
}

#[test]
fn undeclared_variable_reference_warns_naming_the_variable() {
    let mut def = valid_pipeline();
    def.stages[0].steps[0].arguments = Some("${MISSING_VAR}".to_string());
    let result = validate(&def);
    assert!(!result.has_errors());
    assert!(result
        .messages
        .iter()
        .any(|m| m.severity == Severity::Warning && m.message.contains("MISSING_VAR")));
}

#[test]
fn builtin_variable_reference_does_not_warn() {
    let mut def = valid_pipeline();
    def.stages[0].steps[0].arguments = Some("${PIPEFORGE_RUN_ID}".to_string());
    let result = validate(&def);
    assert!(!result
        .messages
        .iter()
        .any(|m| m.message.contains("PIPEFORGE_RUN_ID")));
}

#[test]
fn declared_variable_reference_does_not_warn() {
    let mut def = valid_pipeline();
    def.variables.insert("FOO".to_string(), "bar".to_string());
    def.stages[0].steps[0].arguments = Some("${FOO}".to_string());
    let result = validate(&def);
    assert!(!result.messages.iter().any(|m| m.message.contains("FOO")));
}

#[test]
fn duplicate_step_names_within_stage_warn() {
    let mut def = valid_pipeline();
    def.stages[0].steps.push(PipelineStep::new("compile", "cc2"));
    let result = validate(&def);
    assert!(!result.has_errors());
    assert!(result
        .messages
        .iter()
        .any(|m| m.severity == Severity::Warning && m.message.contains("duplicate step name")));
}

#[test]
fn empty_watch_path_is_an_error() {
    let mut def = valid_pipeline();
    def.watch.push(WatchTrigger {
        path: String::new(),
        ..WatchTrigger::default()
    });
    let result = validate(&def);
    assert!(result.has_errors());
}

#[test]
fn stage_condition_referencing_undeclared_variable_warns() {
    let mut def = valid_pipeline();
    def.stages[0].condition = Some(StageCondition {
        only_if: Some("NOT_DECLARED".to_string()),
        ..StageCondition::default()
    });
    let result = validate(&def);
    assert!(!result.has_errors());
    assert!(result
        .messages
        .iter()
        .any(|m| m.message.contains("NOT_DECLARED")));
}

#[test]
fn warnings_never_set_has_errors() {
    let mut def = valid_pipeline();
    def.version = 0;
    def.stages[0].steps[0].arguments = Some("${UNDECLARED}".to_string());
    let result = validate(&def);
    assert!(!result.has_errors());
}
