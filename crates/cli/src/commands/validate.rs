// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pipeforge validate <file>` — static checks only, no execution.

use crate::color;
use anyhow::{Context, Result};
use clap::Args;
use pipeforge_validate::Severity;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Pipeline YAML file
    pub file: PathBuf,
}

pub fn handle(args: ValidateArgs) -> Result<i32> {
    let definition = pipeforge_yaml::load_pipeline_file(&args.file)
        .with_context(|| format!("loading pipeline {}", args.file.display()))?;

    let result = pipeforge_validate::validate(&definition);
    for message in &result.messages {
        let text = format!("{}: {}", message.location, message.message);
        match message.severity {
            Severity::Error => eprintln!("{}", color::red(&format!("error: {text}"))),
            Severity::Warning => eprintln!("{}", color::yellow(&format!("warning: {text}"))),
        }
    }

    if result.has_errors() {
        Ok(1)
    } else {
        println!("{}", color::green("pipeline is valid"));
        Ok(0)
    }
}
