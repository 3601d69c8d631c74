//! Paste ingestion: decide whether a paste goes into the buffer verbatim or gets buffered into a
//! temporary file behind an `@paste-N` placeholder.

use std::fs::DirBuilder;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;

use tempfile::Builder;

use super::attachments::Attachment;
use super::attachments::AttachmentError;
use crate::size_format::format_size_compact;

pub(crate) const PASTE_PLACEHOLDER_PREFIX: &str = "@paste-";

/// Limits under which a paste is inserted inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InlinePasteLimits {
    pub max_lines: usize,
    pub max_chars: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum PasteDisposition {
    Inline(String),
    Buffered(String),
}

/// Terminals deliver bracketed pastes with `\r` or `\r\n` line endings.
pub(crate) fn normalize_newlines(pasted: &str) -> String {
    pasted.replace("\r\n", "\n").replace('\r', "\n")
}

/// Number of lines in a paste. A trailing newline does not open an extra line.
pub(crate) fn paste_line_count(text: &str) -> usize {
    text.lines().count()
}

pub(crate) fn classify(pasted: &str, limits: InlinePasteLimits) -> PasteDisposition {
    let text = normalize_newlines(pasted);
    let lines = paste_line_count(&text);
    let chars = text.chars().count();
    if lines <= limits.max_lines && chars <= limits.max_chars {
        PasteDisposition::Inline(text)
    } else {
        PasteDisposition::Buffered(text)
    }
}

/// `@paste-<digits>`.
pub(crate) fn is_paste_placeholder(token: &str) -> bool {
    token
        .strip_prefix(PASTE_PLACEHOLDER_PREFIX)
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Writes buffered pastes into a private directory and hands out sequential placeholders.
#[derive(Debug)]
pub(crate) struct PasteStore {
    dir: PathBuf,
    next_number: u64,
}

impl PasteStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            next_number: 1,
        }
    }

    /// Materialize `content` as a temporary attachment.
    ///
    /// The paste number is only consumed when the file was written, so a failed attempt does not
    /// leave a gap in the sequence.
    pub fn buffer(&mut self, content: &str) -> Result<Attachment, AttachmentError> {
        let number = self.next_number;
        ensure_private_dir(&self.dir)?;

        let write_err = |source| AttachmentError::WritePaste {
            dir: self.dir.clone(),
            source,
        };
        let mut file = Builder::new()
            .prefix(&format!("paste-{number}-"))
            .suffix(".txt")
            .tempfile_in(&self.dir)
            .map_err(write_err)?;
        file.write_all(content.as_bytes()).map_err(write_err)?;
        file.flush().map_err(write_err)?;
        let path = file.into_temp_path();

        self.next_number += 1;
        let size_bytes = content.len() as u64;
        tracing::debug!("buffered paste {number} ({size_bytes} bytes) at {}", path.display());
        Ok(Attachment::temporary(
            format!("{PASTE_PLACEHOLDER_PREFIX}{number}"),
            format!("paste-{number} ({})", format_size_compact(size_bytes)),
            size_bytes,
            path,
        ))
    }
}

fn ensure_private_dir(dir: &Path) -> Result<(), AttachmentError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt as _;
        builder.mode(0o700);
    }
    builder
        .create(dir)
        .map_err(|source| AttachmentError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })
}
