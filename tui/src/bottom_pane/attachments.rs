//! Live attachments embedded in the composer buffer.
//!
//! An attachment is a pasted blob (backed by a temporary file this crate owns) or a file
//! reference (backed by a file the user owns). Each one is bound to a placeholder token that
//! appears verbatim in the buffer text, e.g. `@paste-3` or `@notes.md`.
//!
//! The registry never caches buffer positions. Spans are recomputed from the current text on
//! every query, so edits that move placeholders around cannot leave stale offsets behind.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io;
use std::ops::Range;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempPath;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

/// Failures while materializing an attachment. None of these are surfaced to the user; callers
/// log them and drop the attachment.
#[derive(Debug, Error)]
pub(crate) enum AttachmentError {
    #[error("failed to create pastes directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write paste into {}: {source}", dir.display())]
    WritePaste {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not a regular file", path.display())]
    NotAFile { path: PathBuf },
}

/// Stable handle for a live attachment. Ids are never reused within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttachmentId(u64);

#[derive(Debug)]
enum Backing {
    /// Deleted when the attachment is released.
    Temporary(TempPath),
    /// Left untouched.
    File(PathBuf),
}

#[derive(Debug)]
pub struct Attachment {
    placeholder: String,
    label: String,
    size_bytes: u64,
    backing: Backing,
}

impl Attachment {
    pub(crate) fn temporary(
        placeholder: String,
        label: String,
        size_bytes: u64,
        path: TempPath,
    ) -> Self {
        Self {
            placeholder,
            label,
            size_bytes,
            backing: Backing::Temporary(path),
        }
    }

    pub(crate) fn file_reference(
        placeholder: String,
        label: String,
        size_bytes: u64,
        path: PathBuf,
    ) -> Self {
        Self {
            placeholder,
            label,
            size_bytes,
            backing: Backing::File(path),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn path(&self) -> &Path {
        match &self.backing {
            Backing::Temporary(path) => &**path,
            Backing::File(path) => path.as_path(),
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self.backing, Backing::Temporary(_))
    }

    fn read_content(&self) -> io::Result<String> {
        std::fs::read_to_string(self.path())
    }

    /// Drop the attachment, deleting its backing file if this crate owns it.
    ///
    /// A backing file that is already gone counts as released.
    fn release(self) {
        let Backing::Temporary(path) = self.backing else {
            return;
        };
        let backing_path = path.to_path_buf();
        match path.close() {
            Ok(()) => debug!("released paste backing file {}", backing_path.display()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!("failed to delete paste file {}: {err}", backing_path.display()),
        }
    }
}

/// One occurrence of a live placeholder in the buffer text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSpan {
    pub range: Range<usize>,
    pub id: AttachmentId,
}

#[derive(Debug, Default)]
pub struct AttachmentRegistry {
    entries: BTreeMap<AttachmentId, Attachment>,
    next_id: u64,
}

impl AttachmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: AttachmentId) -> Option<&Attachment> {
        self.entries.get(&id)
    }

    /// Live attachments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (AttachmentId, &Attachment)> {
        self.entries.iter().map(|(id, attachment)| (*id, attachment))
    }

    pub fn contains_placeholder(&self, placeholder: &str) -> bool {
        self.entries
            .values()
            .any(|attachment| attachment.placeholder == placeholder)
    }

    /// Register `attachment`. Returns `None` (and releases the attachment) when its placeholder
    /// is already live.
    pub fn add(&mut self, attachment: Attachment) -> Option<AttachmentId> {
        if attachment.placeholder.is_empty() || self.contains_placeholder(&attachment.placeholder)
        {
            debug!(
                "rejecting attachment with duplicate placeholder {}",
                attachment.placeholder
            );
            attachment.release();
            return None;
        }
        let id = AttachmentId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, attachment);
        Some(id)
    }

    /// Every placeholder occurrence in `text`, ordered by start offset.
    ///
    /// Spans never overlap. When two live placeholders match at overlapping positions (one is a
    /// prefix of the other, like `@paste-1` and `@paste-12`), the earlier one wins, and at the
    /// same start the longer one wins.
    pub fn spans(&self, text: &str) -> Vec<PlaceholderSpan> {
        let mut candidates: Vec<PlaceholderSpan> = self
            .entries
            .iter()
            .flat_map(|(id, attachment)| {
                text.match_indices(attachment.placeholder.as_str())
                    .map(move |(start, matched)| PlaceholderSpan {
                        range: start..start + matched.len(),
                        id: *id,
                    })
            })
            .collect();
        candidates.sort_by(|a, b| {
            a.range
                .start
                .cmp(&b.range.start)
                .then(b.range.end.cmp(&a.range.end))
        });

        let mut spans: Vec<PlaceholderSpan> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let overlaps = spans
                .last()
                .is_some_and(|prev| candidate.range.start < prev.range.end);
            if !overlaps {
                spans.push(candidate);
            }
        }
        spans
    }

    /// The placeholder span touching `offset`, boundaries included. When two placeholders are
    /// adjacent at `offset`, the one ending there wins.
    pub fn find_at(&self, text: &str, offset: usize) -> Option<PlaceholderSpan> {
        self.spans(text)
            .into_iter()
            .find(|span| span.range.start <= offset && offset <= span.range.end)
    }

    /// The span a backward edit at `offset` lands in: `start < offset <= end`.
    pub fn find_before(&self, text: &str, offset: usize) -> Option<PlaceholderSpan> {
        self.find_at(text, offset).filter(|span| span.range.start < offset)
    }

    /// The span a forward edit at `offset` lands in: `start <= offset < end`.
    pub fn find_after(&self, text: &str, offset: usize) -> Option<PlaceholderSpan> {
        self.spans(text)
            .into_iter()
            .find(|span| span.range.start <= offset && offset < span.range.end)
    }

    /// Remove one attachment, deleting its temporary backing file.
    pub fn remove(&mut self, id: AttachmentId) -> bool {
        match self.entries.remove(&id) {
            Some(attachment) => {
                attachment.release();
                true
            }
            None => false,
        }
    }

    /// Remove every attachment whose placeholder no longer occurs in `text`. Returns how many
    /// were removed.
    pub fn retain_present(&mut self, text: &str) -> usize {
        let present = self.present_ids(text);
        let stale: Vec<AttachmentId> = self
            .entries
            .keys()
            .filter(|id| !present.contains(id))
            .copied()
            .collect();
        for id in &stale {
            self.remove(*id);
        }
        stale.len()
    }

    /// Read the content of every attachment referenced by `final_text`, then release all
    /// attachments, referenced or not.
    ///
    /// Unreadable attachments are logged and left out of the map.
    pub fn resolve_and_clear(&mut self, final_text: &str) -> BTreeMap<String, String> {
        let present = self.present_ids(final_text);
        let mut resolved = BTreeMap::new();
        for (id, attachment) in std::mem::take(&mut self.entries) {
            if present.contains(&id) {
                match attachment.read_content() {
                    Ok(content) => {
                        resolved.insert(attachment.placeholder.clone(), content);
                    }
                    Err(err) => warn!(
                        "failed to read attachment {} from {}: {err}",
                        attachment.placeholder,
                        attachment.path().display()
                    ),
                }
            }
            attachment.release();
        }
        resolved
    }

    /// Release every attachment.
    pub fn clear(&mut self) {
        for (_, attachment) in std::mem::take(&mut self.entries) {
            attachment.release();
        }
    }

    fn present_ids(&self, text: &str) -> BTreeSet<AttachmentId> {
        self.spans(text).into_iter().map(|span| span.id).collect()
    }
}

impl Drop for AttachmentRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}
