// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pipeforge init <template>` / `pipeforge templates`.

use crate::color;
use crate::commands::templates;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Template name
    pub template: String,

    /// File to write the template to (default: pipeforge.yaml)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn handle(args: InitArgs) -> Result<i32> {
    let Some(template) = templates::find(&args.template) else {
        let names: Vec<&str> = templates::TEMPLATES.iter().map(|t| t.name).collect();
        anyhow::bail!(
            "unknown template '{}'; available templates: {}",
            args.template,
            names.join(", ")
        );
    };

    let output = args.output.unwrap_or_else(|| PathBuf::from("pipeforge.yaml"));
    std::fs::write(&output, template.yaml)
        .with_context(|| format!("writing template to {}", output.display()))?;

    println!(
        "{}",
        color::green(&format!("wrote {} template to {}", template.name, output.display()))
    );
    Ok(0)
}

pub fn list() -> Result<i32> {
    for template in templates::TEMPLATES {
        let padded = format!("{:<12}", template.name);
        println!("{} {}", color::dim(&padded), template.description);
    }
    Ok(0)
}
