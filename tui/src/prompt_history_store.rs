//! Persistent prompt history store.
//!
//! A small, text-only JSONL log (by default `~/.promptpad/history.jsonl`). It is the default
//! [`HistorySource`] for composer suggestions, and every submission is appended to it.

use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::bottom_pane::HistorySource;

const MAX_ENTRIES: usize = 500;

/// Persistent prompt history backed by a JSONL file.
#[derive(Debug)]
pub struct PromptHistoryStore {
    path: Option<PathBuf>,
    entries: Vec<HistoryEntry>,
}

impl PromptHistoryStore {
    /// Create a store backed by the provided history file path.
    ///
    /// When `path` is `None`, persistence is disabled and the store is purely in-memory.
    pub fn new_with_path(path: Option<PathBuf>) -> Self {
        let mut entries: Vec<HistoryEntry> = Vec::new();
        if let Some(path) = path.as_deref() {
            let (loaded, needs_truncate) = load_history_entries(path);
            entries = loaded;

            if needs_truncate {
                // Best-effort truncate so startup doesn't carry unbounded history.
                let _ = persist_history(path, &entries);
            }
        }

        Self { path, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a prompt submission (trimmed), dedupe consecutive duplicates, and persist
    /// best-effort.
    pub fn record_submission(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        if self.entries.last().is_some_and(|prev| prev.text == text) {
            return;
        }

        self.entries.push(HistoryEntry {
            ts: unix_timestamp_secs(),
            text: text.to_string(),
        });

        if self.entries.len() > MAX_ENTRIES {
            let drop_count = self.entries.len() - MAX_ENTRIES;
            self.entries.drain(0..drop_count);
        }

        let Some(path) = self.path.as_deref() else {
            return;
        };

        if let Err(err) = persist_history(path, &self.entries) {
            tracing::warn!(
                "failed to persist prompt history to {}: {err}",
                path.display()
            );
        }
    }
}

impl HistorySource for PromptHistoryStore {
    fn latest_match(&self, prefix: &str) -> Option<String> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.text.starts_with(prefix))
            .map(|entry| entry.text.clone())
    }

    fn record(&mut self, text: &str) {
        self.record_submission(text);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryEntry {
    ts: u64,
    text: String,
}

fn unix_timestamp_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn load_history_entries(path: &Path) -> (Vec<HistoryEntry>, bool) {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return (Vec::new(), false),
        Err(err) => {
            tracing::warn!(
                "failed to read prompt history from {}: {err}",
                path.display()
            );
            return (Vec::new(), false);
        }
    };

    let mut out = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry: HistoryEntry = match serde_json::from_str(line) {
            Ok(entry) => entry,
            Err(_) => continue,
        };
        if entry.text.is_empty() {
            continue;
        }
        out.push(entry);
    }

    if out.len() <= MAX_ENTRIES {
        return (out, false);
    }

    let start = out.len() - MAX_ENTRIES;
    (out.split_off(start), true)
}

/// Rewrite the whole log through a temp file in the same directory, so a crash mid-write never
/// leaves a truncated history behind.
fn persist_history(path: &Path, entries: &[HistoryEntry]) -> io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::other("history path has no parent directory"))?;
    std::fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    for entry in entries {
        let line = serde_json::to_string(entry).map_err(|err| io::Error::other(err.to_string()))?;
        writeln!(file, "{line}")?;
    }
    file.flush()?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}
