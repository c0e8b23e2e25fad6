// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The three observation events `execute` fires, and the synchronous
//! handler trait subscribers implement. Handlers run on the engine's own
//! logical thread — the engine never awaits inside a handler call, so a
//! handler that needs asynchronous human input must bridge it with its own
//! blocking channel/future internally.

use pipeforge_core::{OutputLine, PipelineRun};

/// The action a breakpoint handler chooses for the step it was shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugAction {
    #[default]
    Continue,
    Skip,
    Retry,
    Abort,
}

pub struct OutputEvent<'a> {
    pub run: &'a PipelineRun,
    pub stage_name: &'a str,
    pub step_name: &'a str,
    pub line: &'a OutputLine,
}

pub struct BeforeStepEvent<'a> {
    pub run: &'a PipelineRun,
    pub stage_name: &'a str,
    pub step_name: &'a str,
    pub step_index: usize,
    pub total_steps: usize,
    /// `true` when this is the failure retry/abort gate (`breakpoint:
    /// on_failure`) rather than the step's normal pre-execution pause.
    pub is_failure_retry_gate: bool,
}

pub struct AfterStepEvent<'a> {
    pub run: &'a PipelineRun,
    pub stage_name: &'a str,
    pub step_name: &'a str,
    pub step_index: usize,
    pub total_steps: usize,
}

/// Subscriber to a running pipeline. All methods have a default no-op (or
/// `Continue`) implementation so observers only need to override what they
/// care about.
pub trait PipelineObserver: Send + Sync {
    fn on_output(&self, _event: OutputEvent<'_>) {}

    fn on_before_step(&self, _event: BeforeStepEvent<'_>) -> DebugAction {
        DebugAction::Continue
    }

    fn on_after_step(&self, _event: AfterStepEvent<'_>) {}
}

/// An observer that does nothing, for non-interactive runs with no
/// interested subscriber.
pub struct NullObserver;

impl PipelineObserver for NullObserver {}
