// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal ANSI coloring for console output, honoring `NO_COLOR`/`COLOR`
//! and falling back to plain text when stderr isn't a terminal.

use std::io::IsTerminal;

const RESET: &str = "\x1b[0m";

/// Priority: `NO_COLOR=1` disables, `COLOR=1` forces, otherwise a TTY check.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stderr().is_terminal()
}

pub fn red(text: &str) -> String {
    paint("\x1b[31m", text)
}

pub fn green(text: &str) -> String {
    paint("\x1b[32m", text)
}

pub fn yellow(text: &str) -> String {
    paint("\x1b[33m", text)
}

pub fn dim(text: &str) -> String {
    paint("\x1b[2m", text)
}

fn paint(code: &str, text: &str) -> String {
    if should_colorize() {
        format!("{code}{text}{RESET}")
    } else {
        text.to_string()
    }
}
