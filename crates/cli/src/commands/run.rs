// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pipeforge run <file>` — load, validate, trust-check and execute a
//! pipeline, optionally re-running it on every debounced filesystem change.

use crate::color;
use crate::observer::{ConsoleObserver, Verbosity};
use anyhow::{Context, Result};
use clap::Args;
use pipeforge_core::{PipelineDefinition, RunStatus};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Pipeline YAML file
    pub file: PathBuf,

    /// Pause before every step for a debug verdict
    #[arg(short, long)]
    pub interactive: bool,

    /// Run once, then re-run on every debounced filesystem change until interrupted
    #[arg(short, long)]
    pub watch: bool,

    /// Print per-step timing alongside streamed output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress streamed step output; only the final summary is printed
    #[arg(short, long)]
    pub quiet: bool,

    /// Raise a best-effort OS notification when a run completes
    #[arg(long)]
    pub notify: bool,
}

pub async fn handle(args: RunArgs) -> Result<i32> {
    let verbosity = if args.verbose {
        Verbosity::Verbose
    } else if args.quiet {
        Verbosity::Quiet
    } else {
        Verbosity::Normal
    };

    let definition = load_and_check(&args.file)?;

    let observer: Arc<dyn pipeforge_engine::PipelineObserver> =
        Arc::new(ConsoleObserver::new(verbosity));

    if !args.watch {
        let status = run_once(&definition, args.interactive, observer, args.notify).await;
        return Ok(exit_code(status));
    }

    run_watch_loop(args.file, args.interactive, observer, args.notify).await
}

fn load_and_check(file: &PathBuf) -> Result<PipelineDefinition> {
    let definition = pipeforge_yaml::load_pipeline_file(file)
        .with_context(|| format!("loading pipeline {}", file.display()))?;

    let result = pipeforge_validate::validate(&definition);
    for message in &result.messages {
        report_validation_message(message);
    }
    if result.has_errors() {
        anyhow::bail!("pipeline has validation errors");
    }

    check_trust(file);
    Ok(definition)
}

fn report_validation_message(message: &pipeforge_validate::ValidationMessage) {
    use pipeforge_validate::Severity;
    let text = format!("{}: {}", message.location, message.message);
    match message.severity {
        Severity::Error => eprintln!("{}", color::red(&format!("error: {text}"))),
        Severity::Warning => eprintln!("{}", color::yellow(&format!("warning: {text}"))),
    }
}

/// Record/refresh the pipeline file's trust entry. Advisory only: every
/// failure is swallowed, and a changed/new file never blocks execution.
fn check_trust(file: &PathBuf) {
    let Some(directory) = pipeforge_trust::TrustStore::default_directory() else {
        return;
    };
    let store = pipeforge_trust::TrustStore::new(directory);
    match store.check(file) {
        Ok(result) => match result.status {
            pipeforge_trust::TrustStatus::New => {
                eprintln!("{}", color::dim("trust: first time seeing this pipeline file"));
            }
            pipeforge_trust::TrustStatus::Modified { .. } => {
                eprintln!(
                    "{}",
                    color::yellow("trust: pipeline file has changed since it was last run")
                );
            }
            pipeforge_trust::TrustStatus::Trusted => {}
        },
        Err(error) => {
            tracing::debug!(%error, "trust store check failed");
        }
    }
    if let Err(error) = store.trust(file, None) {
        tracing::debug!(%error, "trust store update failed");
    }
}

async fn run_once(
    definition: &PipelineDefinition,
    interactive: bool,
    observer: Arc<dyn pipeforge_engine::PipelineObserver>,
    notify: bool,
) -> RunStatus {
    let (handle, cancel) = pipeforge_engine::cancellation_channel();
    let ctrl_c = tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        handle.cancel();
    });

    let run = pipeforge_engine::execute(definition, interactive, cancel, observer).await;
    ctrl_c.abort();

    print_summary(&run);
    if notify {
        notify_completion(&run);
    }
    run.status
}

async fn run_watch_loop(
    file: PathBuf,
    interactive: bool,
    observer: Arc<dyn pipeforge_engine::PipelineObserver>,
    notify: bool,
) -> Result<i32> {
    let definition = pipeforge_yaml::load_pipeline_file(&file)?;
    let mut status = run_once(&definition, interactive, observer.clone(), notify).await;
    ring_bell();
    if status != RunStatus::Success {
        eprintln!("{}", color::red("watch: initial run failed, continuing to watch for changes"));
    }

    let triggers: Vec<pipeforge_watch::Trigger> = definition
        .watch
        .iter()
        .map(|trigger| pipeforge_watch::Trigger {
            path: PathBuf::from(&trigger.path),
            filter: trigger.filter.clone(),
            include_subdirectories: trigger.include_subdirectories,
            debounce_ms: trigger.debounce_ms,
        })
        .collect();

    if triggers.is_empty() {
        eprintln!(
            "{}",
            color::yellow("watch: pipeline declares no watch triggers, nothing to observe")
        );
        return Ok(exit_code(status));
    }

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let watcher = pipeforge_watch::start(
        triggers,
        pipeforge_watch::DEFAULT_MIN_TRIGGER_INTERVAL,
        move |event| {
            let _ = tx.send(event);
        },
    )
    .context("starting file watcher")?;

    let mut interrupted = tokio::signal::ctrl_c();
    loop {
        tokio::select! {
            _ = &mut interrupted => break,
            event = rx.recv() => {
                let Some(event) = event else { break };
                eprintln!(
                    "{}",
                    color::dim(&format!("watch: change detected at {}", event.path.display()))
                );
                let definition = match pipeforge_yaml::load_pipeline_file(&file) {
                    Ok(definition) => definition,
                    Err(error) => {
                        eprintln!("{}", color::red(&format!("watch: failed to reload pipeline: {error}")));
                        continue;
                    }
                };
                status = run_once(&definition, interactive, observer.clone(), notify).await;
                ring_bell();
            }
        }
    }

    watcher.stop();
    Ok(exit_code(status))
}

fn ring_bell() {
    print!("\x07");
    let _ = std::io::Write::flush(&mut std::io::stdout());
}

fn notify_completion(run: &pipeforge_core::PipelineRun) {
    let summary = if run.status == RunStatus::Success {
        format!("{} succeeded", run.pipeline_name)
    } else {
        format!("{} finished as {:?}", run.pipeline_name, run.status)
    };
    if let Err(error) = notify_rust::Notification::new()
        .summary("PipeForge")
        .body(&summary)
        .show()
    {
        tracing::debug!(%error, "desktop notification failed");
    }
}

fn print_summary(run: &pipeforge_core::PipelineRun) {
    let now = chrono::Utc::now();
    let summary = run.summary(now);
    let elapsed_ms = summary.elapsed.num_milliseconds().max(0);
    let line = format!(
        "{} — {:?} in {}ms ({} ok, {} failed, {} skipped)",
        summary.pipeline_name,
        summary.status,
        elapsed_ms,
        summary.success_count,
        summary.failed_count,
        summary.skipped_count,
    );
    match summary.status {
        RunStatus::Success => println!("{}", color::green(&line)),
        RunStatus::Failed | RunStatus::Cancelled => eprintln!("{}", color::red(&line)),
        _ => println!("{line}"),
    }
}

fn exit_code(status: RunStatus) -> i32 {
    i32::from(status != RunStatus::Success)
}
