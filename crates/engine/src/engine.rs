// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sequences a pipeline's stages and steps, one at a time, emitting the
//! three observation events along the way.

use crate::cancel::CancellationSignal;
use crate::condition::{stage_condition_met, step_condition_met};
use crate::error::EngineError;
use crate::observer::{AfterStepEvent, BeforeStepEvent, DebugAction, OutputEvent, PipelineObserver};
use chrono::Utc;
use pipeforge_core::vars::substitute;
use pipeforge_core::{
    ArtifactInfo, BreakpointMode, IdGen, OutputLine, PipelineDefinition, PipelineRun,
    PipelineStep, RunId, RunStatus, StepResult, StepStatus, UuidIdGen,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Run `definition` to completion (or cancellation), returning the fully
/// populated [`PipelineRun`]. `interactive` forces a breakpoint before
/// every step regardless of that step's own `breakpoint` setting.
pub async fn execute(
    definition: &PipelineDefinition,
    interactive: bool,
    cancel: CancellationSignal,
    observer: Arc<dyn PipelineObserver>,
) -> PipelineRun {
    let started_at = Utc::now();
    let run_id = RunId::new(UuidIdGen.next());
    let mut run = PipelineRun::new(run_id, definition.name.clone(), started_at);
    run.status = RunStatus::Running;
    run.variables = definition.variables.clone();

    let work_dir = pipeforge_paths::normalize(
        definition.working_directory.as_deref().unwrap_or("."),
        None,
    );
    inject_builtin_variables(&mut run, &work_dir);

    let total_steps = definition.total_steps();
    let mut last_exit_code: Option<i32> = None;

    let mut step_index = 0usize;
    for stage in &definition.stages {
        if !stage_condition_met(&stage.condition, &run.variables, &work_dir) {
            tracing::info!(stage = %stage.name, "stage condition not met, skipping");
            continue;
        }

        for step in &stage.steps {
            step_index += 1;

            if cancel.is_cancelled() {
                return finish_cancelled(run);
            }

            if !step_condition_met(&step.condition, &run.variables, last_exit_code) {
                push_skipped(&mut run, &stage.name, &step.name);
                continue;
            }

            let should_pause = interactive || step.breakpoint == BreakpointMode::Always;
            let action = if should_pause {
                fire_before_step(
                    &observer,
                    &mut run,
                    &stage.name,
                    &step.name,
                    step_index,
                    total_steps,
                    false,
                )
            } else {
                DebugAction::Continue
            };

            match action {
                DebugAction::Skip => {
                    push_skipped(&mut run, &stage.name, &step.name);
                    continue;
                }
                DebugAction::Abort => return finish_cancelled(run),
                // Retry before a step has ever executed is equivalent to Continue.
                DebugAction::Continue | DebugAction::Retry => {}
            }

            let (index, cancelled) = execute_step(
                &mut run, &stage.name, step, &work_dir, &observer, &cancel,
            )
            .await;
            last_exit_code = Some(run.step_results[index].exit_code);
            fire_after_step(&observer, &run, &stage.name, &step.name, step_index, total_steps);

            if cancelled {
                return finish_cancelled(run);
            }

            let failed = run.step_results[index].status == StepStatus::Failed;
            if !failed || step.allow_failure {
                continue;
            }

            if step.breakpoint != BreakpointMode::OnFailure {
                if !stage.continue_on_error {
                    return finish_terminal(run, RunStatus::Failed);
                }
                continue;
            }

            let gate_action = fire_before_step(
                &observer,
                &mut run,
                &stage.name,
                &step.name,
                step_index,
                total_steps,
                true,
            );

            match gate_action {
                DebugAction::Retry => {
                    let (retry_index, retry_cancelled) = execute_step(
                        &mut run, &stage.name, step, &work_dir, &observer, &cancel,
                    )
                    .await;
                    last_exit_code = Some(run.step_results[retry_index].exit_code);
                    fire_after_step(
                        &observer, &run, &stage.name, &step.name, step_index, total_steps,
                    );
                    if retry_cancelled {
                        return finish_cancelled(run);
                    }
                    let still_failed = run.step_results[retry_index].status == StepStatus::Failed;
                    if still_failed && !stage.continue_on_error {
                        return finish_terminal(run, RunStatus::Failed);
                    }
                }
                DebugAction::Skip => continue,
                DebugAction::Abort => return finish_cancelled(run),
                DebugAction::Continue => {
                    if !stage.continue_on_error {
                        return finish_terminal(run, RunStatus::Failed);
                    }
                }
            }
        }
    }

    let final_status = if run.has_failures() {
        RunStatus::Failed
    } else {
        RunStatus::Success
    };
    finish_terminal(run, final_status)
}

fn inject_builtin_variables(run: &mut PipelineRun, work_dir: &Path) {
    run.variables.insert(
        "PIPEFORGE_WORK_DIR".to_string(),
        work_dir.to_string_lossy().into_owned(),
    );
    run.variables
        .insert("PIPEFORGE_RUN_ID".to_string(), run.id.as_str().to_string());
    run.variables
        .insert("PIPEFORGE_PIPELINE".to_string(), run.pipeline_name.clone());
}

fn push_skipped(run: &mut PipelineRun, stage_name: &str, step_name: &str) {
    let now = Utc::now();
    let mut result = StepResult::new(step_name.to_string(), stage_name.to_string(), now);
    result.status = StepStatus::Skipped;
    result.completed_at = Some(now);
    run.step_results.push(result);
}

fn finish_cancelled(mut run: PipelineRun) -> PipelineRun {
    run.status = RunStatus::Cancelled;
    run.completed_at = Some(Utc::now());
    run
}

fn finish_terminal(mut run: PipelineRun, status: RunStatus) -> PipelineRun {
    run.status = status;
    run.completed_at = Some(Utc::now());
    run
}

#[allow(clippy::too_many_arguments)]
fn fire_before_step(
    observer: &Arc<dyn PipelineObserver>,
    run: &mut PipelineRun,
    stage_name: &str,
    step_name: &str,
    step_index: usize,
    total_steps: usize,
    is_failure_retry_gate: bool,
) -> DebugAction {
    run.status = RunStatus::Paused;
    let action = observer.on_before_step(BeforeStepEvent {
        run,
        stage_name,
        step_name,
        step_index,
        total_steps,
        is_failure_retry_gate,
    });
    run.status = RunStatus::Running;
    action
}

fn fire_after_step(
    observer: &Arc<dyn PipelineObserver>,
    run: &PipelineRun,
    stage_name: &str,
    step_name: &str,
    step_index: usize,
    total_steps: usize,
) {
    observer.on_after_step(AfterStepEvent {
        run,
        stage_name,
        step_name,
        step_index,
        total_steps,
    });
}

/// Execute one step to completion: builds its environment and resolved
/// command, runs it, records output as it streams in, then gathers
/// artifacts. Returns the index of its `StepResult` within `run.step_results`
/// and whether the step was cut short by a mid-step cancellation.
async fn execute_step(
    run: &mut PipelineRun,
    stage_name: &str,
    step: &PipelineStep,
    work_dir: &Path,
    observer: &Arc<dyn PipelineObserver>,
    cancel: &CancellationSignal,
) -> (usize, bool) {
    let started_at = Utc::now();
    let mut result = StepResult::new(step.name.clone(), stage_name.to_string(), started_at);
    result.status = StepStatus::Running;

    let environment: BTreeMap<String, String> = step
        .environment
        .iter()
        .map(|(key, value)| (key.clone(), substitute(value, &run.variables)))
        .collect();
    result.environment = environment.clone();

    let command = substitute(&step.command, &run.variables);
    let arguments = step
        .arguments
        .as_deref()
        .map(|arguments| substitute(arguments, &run.variables));
    let resolved_command = match arguments.as_deref() {
        Some(arguments) if !arguments.is_empty() => format!("{command} {arguments}"),
        _ => command,
    };
    result.resolved_command = resolved_command.clone();

    let step_work_dir = resolve_step_work_dir(step, &run.variables, work_dir);

    let index = run.step_results.len();
    run.step_results.push(result);

    let mut merged_env = run.variables.clone();
    merged_env.extend(environment);

    let spec = pipeforge_runner::CommandSpec {
        command: resolved_command,
        working_directory: Some(step_work_dir.clone()),
        environment: merged_env.into_iter().collect(),
        timeout: Duration::from_secs(u64::from(step.timeout_seconds)),
    };

    let (cancel_tx, cancel_rx) = oneshot::channel();
    let mut cancel_watch = cancel.clone();
    let watcher = tokio::spawn(async move {
        cancel_watch.cancelled().await;
        let _ = cancel_tx.send(());
    });

    let step_name = step.name.clone();
    let stage_name_owned = stage_name.to_string();
    let outcome = {
        let on_line = |source: pipeforge_runner::OutputSource, line: String| {
            let output_line = OutputLine {
                timestamp: Utc::now(),
                text: line,
                source: match source {
                    pipeforge_runner::OutputSource::StdOut => pipeforge_core::OutputSource::StdOut,
                    pipeforge_runner::OutputSource::StdErr => pipeforge_core::OutputSource::StdErr,
                },
            };
            match output_line.source {
                pipeforge_core::OutputSource::StdOut => {
                    run.step_results[index].stdout.push(output_line.clone())
                }
                pipeforge_core::OutputSource::StdErr => {
                    run.step_results[index].stderr.push(output_line.clone())
                }
            }
            observer.on_output(OutputEvent {
                run,
                stage_name: &stage_name_owned,
                step_name: &step_name,
                line: &output_line,
            });
        };
        pipeforge_runner::run(spec, on_line, cancel_rx).await
    };
    watcher.abort();

    let cancelled = apply_outcome(&mut run.step_results[index], outcome, step.timeout_seconds);

    if run.step_results[index].status == StepStatus::Failed {
        let stderr_text = run.step_results[index]
            .stderr
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let hints = pipeforge_hints::analyze(
            &stderr_text,
            run.step_results[index].error_message.as_deref(),
        );
        run.step_results[index].hints = hints;
    }

    for pattern in &step.artifacts {
        let resolved_pattern = substitute(pattern, &run.variables);
        gather_artifacts(run, index, &step_work_dir, &resolved_pattern);
    }

    run.step_results[index].completed_at = Some(Utc::now());
    (index, cancelled)
}

fn resolve_step_work_dir(
    step: &PipelineStep,
    variables: &BTreeMap<String, String>,
    default_dir: &Path,
) -> PathBuf {
    match &step.working_directory {
        Some(dir) => pipeforge_paths::normalize(&substitute(dir, variables), Some(default_dir)),
        None => default_dir.to_path_buf(),
    }
}

/// Applies a step's outcome to its `StepResult`. Returns `true` when the
/// outcome was a mid-step cancellation, so the caller can route the whole
/// run to `RunStatus::Cancelled` instead of treating it as an ordinary
/// step failure.
fn apply_outcome(
    result: &mut StepResult,
    outcome: Result<i32, pipeforge_runner::RunError>,
    timeout_seconds: u32,
) -> bool {
    match outcome {
        Ok(exit_code) => {
            result.exit_code = exit_code;
            result.status = if exit_code == 0 {
                StepStatus::Success
            } else {
                StepStatus::Failed
            };
            if result.status == StepStatus::Failed {
                result.error_message = Some(format!("Process exited with code {exit_code}"));
            }
            false
        }
        Err(error @ pipeforge_runner::RunError::Cancelled) => {
            result.status = StepStatus::Failed;
            result.error_message = Some(EngineError::from(error).to_string());
            true
        }
        Err(error) => {
            result.status = StepStatus::Failed;
            result.error_message = Some(EngineError::from(error_with_timeout(error, timeout_seconds)).to_string());
            false
        }
    }
}

fn error_with_timeout(error: pipeforge_runner::RunError, timeout_seconds: u32) -> pipeforge_runner::RunError {
    match error {
        pipeforge_runner::RunError::Timeout(_) => {
            pipeforge_runner::RunError::Timeout(Duration::from_secs(u64::from(timeout_seconds)))
        }
        other => other,
    }
}

fn gather_artifacts(run: &mut PipelineRun, index: usize, base_dir: &Path, pattern: &str) {
    let full_pattern = pipeforge_paths::normalize(pattern, Some(base_dir));
    let Some(pattern_str) = full_pattern.to_str() else {
        return;
    };
    let Ok(entries) = glob::glob(pattern_str) else {
        return;
    };
    let step_name = run.step_results[index].step_name.clone();
    for path in entries.flatten() {
        let Ok(metadata) = std::fs::metadata(&path) else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let created_at = metadata
            .created()
            .map(chrono::DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        run.artifacts.push(ArtifactInfo {
            path: path.clone(),
            step_name: step_name.clone(),
            size_bytes: metadata.len(),
            created_at,
        });
        run.step_results[index].artifacts.push(path);
    }
}
