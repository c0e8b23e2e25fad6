// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The categories a step (or the engine body around it) can fail with.
//! These never cross the `execute` boundary as a `Result` — they're
//! captured into a [`StepResult`](pipeforge_core::StepResult)'s
//! `error_message` or used to set the run's terminal status — but keeping
//! them as a typed enum here documents the failure kinds in one place.

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("step timed out after {0}s")]
    Timeout(u32),
    #[error("step was cancelled")]
    Cancelled,
    #[error("internal engine error: {0}")]
    Internal(String),
}

impl From<pipeforge_runner::RunError> for EngineError {
    fn from(error: pipeforge_runner::RunError) -> Self {
        match error {
            pipeforge_runner::RunError::Timeout(duration) => {
                EngineError::Timeout(duration.as_secs() as u32)
            }
            pipeforge_runner::RunError::Cancelled => EngineError::Cancelled,
            pipeforge_runner::RunError::Spawn(source) => {
                EngineError::Internal(source.to_string())
            }
        }
    }
}
