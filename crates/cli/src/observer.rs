// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The console's [`PipelineObserver`]: streams step output as it arrives,
//! colors stderr, and implements the interactive breakpoint prompt.

use crate::color;
use pipeforge_core::OutputSource;
use pipeforge_engine::{AfterStepEvent, BeforeStepEvent, DebugAction, OutputEvent, PipelineObserver};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

pub struct ConsoleObserver {
    verbosity: Verbosity,
}

impl ConsoleObserver {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

impl PipelineObserver for ConsoleObserver {
    fn on_output(&self, event: OutputEvent<'_>) {
        if self.verbosity == Verbosity::Quiet {
            return;
        }
        match event.line.source {
            OutputSource::StdOut => println!("{}", event.line.text),
            OutputSource::StdErr => eprintln!("{}", color::red(&event.line.text)),
        }
    }

    fn on_before_step(&self, event: BeforeStepEvent<'_>) -> DebugAction {
        if event.is_failure_retry_gate {
            print_failure_gate(&event);
        } else {
            println!(
                "{}",
                color::yellow(&format!(
                    "-> [{}/{}] {} :: {}",
                    event.step_index, event.total_steps, event.stage_name, event.step_name
                ))
            );
        }
        prompt_action()
    }

    fn on_after_step(&self, event: AfterStepEvent<'_>) {
        if self.verbosity != Verbosity::Verbose {
            return;
        }
        let Some(result) = event.run.step_results.last() else {
            return;
        };
        println!(
            "{}",
            color::dim(&format!(
                "   [{}/{}] {} finished: {:?} (exit {})",
                event.step_index, event.total_steps, event.step_name, result.status, result.exit_code
            ))
        );
    }
}

fn print_failure_gate(event: &BeforeStepEvent<'_>) {
    let Some(result) = event.run.step_results.last() else {
        return;
    };
    println!(
        "{}",
        color::red(&format!(
            "!! step '{}' failed (exit {})",
            event.step_name, result.exit_code
        ))
    );
    for line in result.last_stderr_lines(pipeforge_core::DEFAULT_ERROR_TAIL_LINES) {
        eprintln!("{}", color::dim(&line.text));
    }
    for hint in &result.hints {
        println!("{}", color::yellow(&format!("hint: {hint}")));
    }
}

fn prompt_action() -> DebugAction {
    print!("[c]ontinue, [s]kip, [r]etry, [a]bort? ");
    let _ = io::stdout().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return DebugAction::Continue;
    }
    match line.trim().to_lowercase().chars().next() {
        Some('s') => DebugAction::Skip,
        Some('r') => DebugAction::Retry,
        Some('a') => DebugAction::Abort,
        _ => DebugAction::Continue,
    }
}
