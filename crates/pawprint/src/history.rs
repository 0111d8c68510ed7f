//! Posting history: a bounded, time-ordered log of emitted captions.
//!
//! The store is the authoritative record between runs. It is loaded once at
//! startup, appended to on every accepted caption, and persisted immediately
//! after each append. A missing or unparsable file loads as empty rather
//! than failing the run.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};

use crate::types::{HistoryEntry, PawprintResult, RecencyWindow};

/// Default cap on stored entries; the oldest are evicted past this.
pub const DEFAULT_MAX_ENTRIES: usize = 500;

/// Bounded FIFO log of posted captions, persisted as pretty JSON.
#[derive(Debug)]
pub struct HistoryStore {
    entries: VecDeque<HistoryEntry>,
    path: PathBuf,
    max_entries: usize,
}

impl HistoryStore {
    /// Load the store from `path` with the default capacity.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        Self::load_with_capacity(path, DEFAULT_MAX_ENTRIES)
    }

    /// Load the store from `path`, evicting oldest entries past
    /// `max_entries`. Absent or corrupt files load as an empty store.
    pub fn load_with_capacity(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Vec<HistoryEntry>>(&text) {
                Ok(list) => list.into(),
                Err(e) => {
                    tracing::warn!(
                        "ignoring unparsable history file {}: {e}",
                        path.display()
                    );
                    VecDeque::new()
                }
            },
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("could not read history file {}: {e}", path.display());
                }
                VecDeque::new()
            }
        };

        let mut store = Self {
            entries,
            path,
            max_entries,
        };
        store.evict();
        store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// The most recent entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&HistoryEntry> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Append an entry, evicting the oldest past the capacity.
    pub fn append(&mut self, caption: impl Into<String>, at: DateTime<Utc>) {
        self.entries.push_back(HistoryEntry {
            time: at,
            caption: caption.into(),
        });
        self.evict();
    }

    fn evict(&mut self) {
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    /// Persist the store as a pretty-printed JSON list.
    pub fn save(&self) -> PawprintResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let entries: Vec<&HistoryEntry> = self.entries.iter().collect();
        let json = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Append and persist in one step; one durable write per accepted
    /// caption.
    pub fn record(&mut self, caption: impl Into<String>, at: DateTime<Utc>) -> PawprintResult<()> {
        self.append(caption, at);
        self.save()
    }

    /// Whether `caption` was used recently: an exact match among the last
    /// `window.last_n` entries, or among entries younger than
    /// `window.days`.
    ///
    /// The time scan walks newest to oldest and stops at the first entry
    /// older than the window; the store is time-ordered so nothing beyond
    /// it can match.
    pub fn used_recently(&self, caption: &str, now: DateTime<Utc>, window: RecencyWindow) -> bool {
        if self
            .entries
            .iter()
            .rev()
            .take(window.last_n)
            .any(|e| e.caption == caption)
        {
            return true;
        }

        let cutoff = now - Duration::days(window.days);
        for entry in self.entries.iter().rev() {
            if entry.time < cutoff {
                break;
            }
            if entry.caption == caption {
                return true;
            }
        }
        false
    }
}
