// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bidirectional mapping between a pipeline's textual YAML form and
//! [`PipelineDefinition`].
//!
//! Wire names use lower-underscore style (`working_directory`,
//! `timeout_seconds`, `include_subdirectories`, `debounce_ms`, `only_if`,
//! `continue_on_error`, `allow_failure`, `breakpoint`) — these fall straight
//! out of `PipelineDefinition`'s own field names via serde, since the data
//! model already names its fields that way. Unknown keys are ignored by
//! default serde_yaml behavior. Defaults from the data model backfill empty
//! fields; serialization omits default values via `#[serde(skip_serializing_if)]`
//! on the data model itself.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use pipeforge_core::PipelineDefinition;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Failure parsing or serializing pipeline YAML.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid pipeline YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure loading/saving a pipeline from/to a file, distinguishing
/// "file not found" and "read error" from a syntactic parse failure.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("pipeline file not found: {0}")]
    NotFound(String),
    #[error("failed to access pipeline file {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Parse a pipeline definition from its textual YAML form.
pub fn parse(text: &str) -> Result<PipelineDefinition, ParseError> {
    Ok(serde_yaml::from_str(text)?)
}

/// Serialize a pipeline definition to its textual YAML form, omitting
/// default-valued fields so a programmatically-built pipeline round-trips
/// to concise output.
pub fn serialize(definition: &PipelineDefinition) -> Result<String, ParseError> {
    Ok(serde_yaml::to_string(definition)?)
}

/// Load a pipeline definition from a file on disk.
pub fn load_pipeline_file(path: impl AsRef<Path>) -> Result<PipelineDefinition, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::NotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse(&text)?)
}

/// Serialize and write a pipeline definition to a file on disk.
pub fn save_pipeline_file(
    path: impl AsRef<Path>,
    definition: &PipelineDefinition,
) -> Result<(), LoadError> {
    let path = path.as_ref();
    let text = serialize(definition)?;
    std::fs::write(path, text).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
