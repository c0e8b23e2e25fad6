// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evaluation of `StageCondition`/`StepCondition` against the run's current
//! variables (and, for steps, the previous step's exit code).

use pipeforge_core::vars::substitute;
use pipeforge_core::{StageCondition, StepCondition};
use std::collections::BTreeMap;
use std::path::Path;

fn truthy(variables: &BTreeMap<String, String>, name: &str) -> bool {
    variables.get(name).is_some_and(|value| !value.is_empty())
}

pub fn stage_condition_met(
    condition: &Option<StageCondition>,
    variables: &BTreeMap<String, String>,
    work_dir: &Path,
) -> bool {
    let Some(condition) = condition else {
        return true;
    };
    if let Some(only_if) = &condition.only_if {
        if !truthy(variables, only_if) {
            return false;
        }
    }
    if let Some(not_if) = &condition.not_if {
        if truthy(variables, not_if) {
            return false;
        }
    }
    condition.requires_files.iter().all(|file| {
        let resolved = substitute(file, variables);
        pipeforge_paths::normalize(&resolved, Some(work_dir)).exists()
    })
}

pub fn step_condition_met(
    condition: &Option<StepCondition>,
    variables: &BTreeMap<String, String>,
    last_exit_code: Option<i32>,
) -> bool {
    let Some(condition) = condition else {
        return true;
    };
    if let Some(only_if) = &condition.only_if {
        if !truthy(variables, only_if) {
            return false;
        }
    }
    if let Some(not_if) = &condition.not_if {
        if truthy(variables, not_if) {
            return false;
        }
    }
    if let Some(required) = condition.requires_exit_code {
        if last_exit_code != Some(required) {
            return false;
        }
    }
    true
}
