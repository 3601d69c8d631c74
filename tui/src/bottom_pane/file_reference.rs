//! `@path` tokens that refer to files on disk.

use std::fs::File;
use std::ops::Range;
use std::path::Path;
use std::path::PathBuf;

use super::attachments::Attachment;
use super::attachments::AttachmentError;
use super::paste::is_paste_placeholder;
use crate::size_format::format_size_compact;

/// Whether `token` looks like a file reference: `@` followed by something path-like.
pub(crate) fn is_candidate(token: &str) -> bool {
    token.starts_with('@')
        && token.chars().count() >= 2
        && !is_paste_placeholder(token)
        && (token.contains('/') || token.contains('.'))
}

/// Byte range of the whitespace-delimited token containing `cursor`.
///
/// A cursor sitting right after the last character of a token counts as inside it.
pub(crate) fn token_at(text: &str, cursor: usize) -> Option<Range<usize>> {
    let cursor = cursor.min(text.len());
    if !text.is_char_boundary(cursor) {
        return None;
    }
    let start = text[..cursor]
        .char_indices()
        .rfind(|(_, c)| c.is_whitespace())
        .map(|(idx, c)| idx + c.len_utf8())
        .unwrap_or(0);
    let end = text[cursor..]
        .char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map(|(idx, _)| cursor + idx)
        .unwrap_or(text.len());
    (start < end).then_some(start..end)
}

/// Resolve `token` (including its leading `@`) against `root` and build a non-temporary
/// attachment for it.
pub(crate) fn resolve(token: &str, root: &Path) -> Result<Attachment, AttachmentError> {
    let raw = token.strip_prefix('@').unwrap_or(token);
    let path = resolve_path(raw, root);

    let metadata = std::fs::metadata(&path).map_err(|source| AttachmentError::Unreadable {
        path: path.clone(),
        source,
    })?;
    if !metadata.is_file() {
        return Err(AttachmentError::NotAFile { path });
    }
    // Metadata alone does not prove the file can be read.
    File::open(&path).map_err(|source| AttachmentError::Unreadable {
        path: path.clone(),
        source,
    })?;

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| raw.to_string());
    let size_bytes = metadata.len();
    Ok(Attachment::file_reference(
        token.to_string(),
        format!("{name} ({})", format_size_compact(size_bytes)),
        size_bytes,
        path,
    ))
}

fn resolve_path(raw: &str, root: &Path) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
