// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sequences a pipeline's stages and steps, emits the engine's observation
//! events, implements the breakpoint protocol, resolves variables and
//! gathers artifacts. The single entry point is [`execute`].

mod cancel;
mod condition;
mod engine;
mod error;
mod observer;

pub use cancel::{cancellation_channel, CancellationHandle, CancellationSignal};
pub use engine::execute;
pub use error::EngineError;
pub use observer::{
    AfterStepEvent, BeforeStepEvent, DebugAction, NullObserver, OutputEvent, PipelineObserver,
};
