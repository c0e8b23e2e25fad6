// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Debounced filesystem change notification over multiple registered
//! triggers. Built on [`notify`] for raw platform events; duplicate
//! suppression and per-key debouncing are layered on top here, since a
//! single trigger commonly fires a burst of raw events for one logical
//! change (a save, a build writing several files).

use glob::Pattern;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Approximates the reference design's 64 KiB internal event buffer as a
/// bounded channel capacity, generous enough to absorb a burst without
/// blocking the platform watcher's callback thread.
const DEFAULT_EVENT_BUFFER_CAPACITY: usize = 4096;

/// Suppresses duplicate triggers for the same key arriving faster than
/// this, independent of the key's own debounce window.
pub const DEFAULT_MIN_TRIGGER_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct Trigger {
    pub path: PathBuf,
    pub filter: String,
    pub include_subdirectories: bool,
    pub debounce_ms: u64,
}

#[derive(Debug, Clone)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub trigger: Trigger,
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("invalid filter glob {0:?}: {1}")]
    InvalidFilter(String, glob::PatternError),
    #[error("filesystem watch error: {0}")]
    Notify(#[from] notify::Error),
}

struct KeyState {
    last_emission: Option<Instant>,
    generation: u64,
}

/// Owns the live platform watchers and the dispatch task; dropping (or
/// calling [`WatcherHandle::stop`]) disables all registrations.
pub struct WatcherHandle {
    _watchers: Vec<RecommendedWatcher>,
    dispatch_task: JoinHandle<()>,
}

impl WatcherHandle {
    pub fn stop(self) {
        self.dispatch_task.abort();
    }
}

/// Start watching every trigger, invoking `on_trigger` (on a background
/// task, never holding the internal debounce-state mutex) once per
/// debounced, non-duplicate filesystem change.
pub fn start(
    triggers: Vec<Trigger>,
    min_trigger_interval: Duration,
    on_trigger: impl Fn(WatchEvent) + Send + Sync + 'static,
) -> Result<WatcherHandle, WatchError> {
    let on_trigger: Arc<dyn Fn(WatchEvent) + Send + Sync> = Arc::new(on_trigger);
    let state: Arc<Mutex<HashMap<String, KeyState>>> = Arc::new(Mutex::new(HashMap::new()));
    let (tx, mut rx) = mpsc::channel::<(Trigger, PathBuf)>(DEFAULT_EVENT_BUFFER_CAPACITY);

    let mut watchers = Vec::with_capacity(triggers.len());
    for trigger in &triggers {
        let pattern = Pattern::new(&trigger.filter)
            .map_err(|e| WatchError::InvalidFilter(trigger.filter.clone(), e))?;
        let trigger_for_callback = trigger.clone();
        let tx = tx.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    for path in &event.paths {
                        if path_matches(path, &trigger_for_callback.path, &pattern) {
                            let _ = tx.blocking_send((trigger_for_callback.clone(), path.clone()));
                        }
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, "file watcher platform error, resuming");
                }
            }
        })?;

        let mode = if trigger.include_subdirectories {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(&trigger.path, mode)?;
        watchers.push(watcher);
    }
    drop(tx);

    let dispatch_task = tokio::spawn(async move {
        while let Some((trigger, path)) = rx.recv().await {
            handle_event(
                trigger,
                path,
                min_trigger_interval,
                Arc::clone(&state),
                Arc::clone(&on_trigger),
            );
        }
    });

    Ok(WatcherHandle {
        _watchers: watchers,
        dispatch_task,
    })
}

fn handle_event(
    trigger: Trigger,
    path: PathBuf,
    min_trigger_interval: Duration,
    state: Arc<Mutex<HashMap<String, KeyState>>>,
    on_trigger: Arc<dyn Fn(WatchEvent) + Send + Sync>,
) {
    let key = trigger_key(&trigger);
    let generation = {
        let mut guard = state.lock();
        let entry = guard.entry(key.clone()).or_insert(KeyState {
            last_emission: None,
            generation: 0,
        });
        if let Some(last) = entry.last_emission {
            if last.elapsed() < min_trigger_interval {
                return;
            }
        }
        entry.generation += 1;
        entry.generation
    };

    let debounce = Duration::from_millis(trigger.debounce_ms);
    tokio::spawn(async move {
        tokio::time::sleep(debounce).await;
        let should_fire = {
            let mut guard = state.lock();
            match guard.get_mut(&key) {
                Some(entry) if entry.generation == generation => {
                    entry.last_emission = Some(Instant::now());
                    true
                }
                _ => false,
            }
        };
        if should_fire {
            on_trigger(WatchEvent { path, trigger });
        }
    });
}

fn trigger_key(trigger: &Trigger) -> String {
    format!("{}:{}", trigger.path.display(), trigger.filter)
}

fn path_matches(event_path: &Path, trigger_path: &Path, pattern: &Pattern) -> bool {
    let trigger_path = trigger_path
        .canonicalize()
        .unwrap_or_else(|_| trigger_path.to_path_buf());
    let event_path_canonical = event_path
        .canonicalize()
        .unwrap_or_else(|_| event_path.to_path_buf());
    if !event_path_canonical.starts_with(&trigger_path) {
        return false;
    }
    event_path
        .file_name()
        .map(|name| pattern.matches(&name.to_string_lossy()))
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
