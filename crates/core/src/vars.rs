// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `${KEY}` textual variable substitution, shared by the validator (which
//! only needs to find references) and the execution engine (which resolves
//! them). Keeping one regex in one place means both always agree on what
//! counts as a variable reference.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap()
    })
}

/// Every `${KEY}` reference appearing in `text`, in order of appearance
/// (duplicates included).
pub fn find_references(text: &str) -> Vec<&str> {
    reference_pattern()
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Replace every `${KEY}` occurrence with `variables[KEY]`. References to
/// undeclared keys are left literal.
pub fn substitute(text: &str, variables: &BTreeMap<String, String>) -> String {
    reference_pattern()
        .replace_all(text, |caps: &regex::Captures| {
            let key = &caps[1];
            variables
                .get(key)
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
#[path = "vars_tests.rs"]
mod tests;
