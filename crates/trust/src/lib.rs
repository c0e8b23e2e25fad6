// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-addressed record of previously-seen pipeline files. A pipeline
//! file is `New` the first time it's checked, `Trusted` once its contents
//! have been explicitly trusted and haven't changed since, or `Modified` if
//! its bytes diverge from the trusted hash. The store is advisory: a
//! corrupt or unwritable backing file degrades to an empty/no-op store
//! rather than failing the caller.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const FILE_NAME: &str = "trusted-hashes.json";
const HOME_SUBDIR: &str = ".pipeforge";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustStatus {
    New,
    Trusted,
    Modified { previous: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub status: TrustStatus,
    pub current_hash: String,
}

/// A directory-bound trust store. Construction reads whatever JSON already
/// exists at `directory/trusted-hashes.json`; every [`TrustStore::trust`]
/// call rewrites that file, best-effort.
pub struct TrustStore {
    file_path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl TrustStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        let file_path = directory.into().join(FILE_NAME);
        let entries = Mutex::new(load(&file_path));
        Self { file_path, entries }
    }

    /// `$PIPEFORGE_HOME` if set, else `~/.pipeforge`. `None` if neither the
    /// override nor a resolvable home directory exists.
    pub fn default_directory() -> Option<PathBuf> {
        if let Some(home) = std::env::var_os("PIPEFORGE_HOME") {
            return Some(PathBuf::from(home));
        }
        dirs::home_dir().map(|home| home.join(HOME_SUBDIR))
    }

    pub fn check(&self, path: &Path) -> io::Result<CheckResult> {
        let current_hash = hash_file(path)?;
        let key = canonical_key(path);
        let entries = self.entries.lock();
        let status = match entries.get(&key) {
            None => TrustStatus::New,
            Some(previous) if *previous == current_hash => TrustStatus::Trusted,
            Some(previous) => TrustStatus::Modified {
                previous: previous.clone(),
            },
        };
        Ok(CheckResult {
            status,
            current_hash,
        })
    }

    /// Trust `path` at `hash`, or at its freshly computed hash if `hash` is
    /// `None`. Returns the hash that was recorded.
    pub fn trust(&self, path: &Path, hash: Option<String>) -> io::Result<String> {
        let hash = match hash {
            Some(hash) => hash,
            None => hash_file(path)?,
        };
        let key = canonical_key(path);
        let mut entries = self.entries.lock();
        entries.insert(key, hash.clone());
        persist(&self.file_path, &entries);
        Ok(hash)
    }
}

fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{digest:x}"))
}

fn canonical_key(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

fn load(file_path: &Path) -> BTreeMap<String, String> {
    fs::read_to_string(file_path)
        .ok()
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or_default()
}

fn persist(file_path: &Path, entries: &BTreeMap<String, String>) {
    if let Some(parent) = file_path.parent() {
        if let Err(error) = fs::create_dir_all(parent) {
            tracing::debug!(%error, "failed to create trust store directory, skipping persist");
            return;
        }
    }
    match serde_json::to_string_pretty(entries) {
        Ok(text) => {
            if let Err(error) = fs::write(file_path, text) {
                tracing::debug!(%error, path = %file_path.display(), "failed to persist trust store");
            }
        }
        Err(error) => tracing::debug!(%error, "failed to serialize trust store"),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
