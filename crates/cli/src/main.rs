// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pipeforge - a local pipeline engine for build/CI automation

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

mod color;
mod commands;
mod observer;

use clap::{Parser, Subcommand};
use commands::{init, run, validate};

#[derive(Parser)]
#[command(name = "pipeforge", version, about = "A local pipeline engine for build/CI automation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and execute a pipeline
    Run(run::RunArgs),
    /// Statically check a pipeline without executing it
    Validate(validate::ValidateArgs),
    /// Write a documented starting pipeline for a named template
    Init(init::InitArgs),
    /// List available template names
    Templates,
}

#[tokio::main]
async fn main() {
    init_logging();
    let code = dispatch().await;
    std::process::exit(code);
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn dispatch() -> i32 {
    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Run(args) => run::handle(args).await,
        Commands::Validate(args) => validate::handle(args),
        Commands::Init(args) => init::handle(args),
        Commands::Templates => init::list(),
    };

    match outcome {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    }
}
