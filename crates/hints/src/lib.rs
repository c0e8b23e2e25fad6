// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Regex-based post-mortem analysis of a failed step's captured stderr and
//! error message. Produces plain-text suggestions; never called for steps
//! that didn't fail.

use regex::Regex;
use std::sync::OnceLock;

/// (pattern, hint) pairs, checked in order, case-insensitive. Several
/// phrasings intentionally share a hint string so that matching more than
/// one of them collapses to a single suggestion.
const CATALOG: &[(&str, &str)] = &[
    (
        r"is not recognized as an? .*? command",
        "Command not found: check that the executable is installed and on PATH.",
    ),
    (
        r"command not found",
        "Command not found: check that the executable is installed and on PATH.",
    ),
    (
        r"no such file or directory",
        "Command not found: check that the executable is installed and on PATH.",
    ),
    (
        r"access is denied",
        "Permission denied: check file permissions or run with elevated privileges.",
    ),
    (
        r"permission denied",
        "Permission denied: check file permissions or run with elevated privileges.",
    ),
    (
        r"sdk not (found|installed)",
        ".NET SDK missing: install the SDK version the project targets.",
    ),
    (
        r"(restore|build) failed",
        ".NET restore/build failed: run `dotnet restore` and `dotnet build` standalone to see the full error.",
    ),
    (
        r"iscc|inno setup",
        "Inno Setup compiler error: check the .iss script's file paths and included sections.",
    ),
    (
        r"timed out|timeout",
        "Step timed out: consider raising timeout_seconds or investigating a hang.",
    ),
    (
        r"exit code 1\b",
        "Exit code 1: check the command's own error output above for specifics.",
    ),
];

fn patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        CATALOG
            .iter()
            .map(|(pattern, _)| {
                #[allow(clippy::unwrap_used)]
                Regex::new(&format!("(?i){pattern}")).unwrap()
            })
            .collect()
    })
}

/// Scan `stderr` plus an optional `error_message` against the catalog,
/// returning the matched hints in catalog order with duplicate text
/// collapsed.
pub fn analyze(stderr: &str, error_message: Option<&str>) -> Vec<String> {
    let combined = match error_message {
        Some(message) => format!("{stderr}\n{message}"),
        None => stderr.to_string(),
    };

    let mut hints: Vec<String> = Vec::new();
    for (regex, (_, hint)) in patterns().iter().zip(CATALOG.iter()) {
        if regex.is_match(&combined) && !hints.iter().any(|existing| existing == hint) {
            hints.push((*hint).to_string());
        }
    }
    hints
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
