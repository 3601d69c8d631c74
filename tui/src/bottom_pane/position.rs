//! Translation between widget cursor coordinates and byte offsets.
//!
//! The input widget reports its cursor as a `(line, column)` pair where `column` counts Unicode
//! scalar values (runes) from the start of the line. Everything that scans the buffer for
//! placeholders works in byte offsets into the flattened UTF-8 text. These two functions are the
//! only bridge between the two coordinate systems.
//!
//! Both directions clamp instead of failing: a line past the last line resolves to the last line,
//! a column past the end of its line resolves to the line end, and a byte offset past the end of
//! the text resolves to the end.

/// A cursor location as understood by the input widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct CursorPos {
    pub line: usize,
    /// Rune (not byte, not grapheme) column within `line`.
    pub column: usize,
}

impl CursorPos {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Convert `pos` into a byte offset into `text`.
pub fn to_byte_offset(text: &str, pos: CursorPos) -> usize {
    let mut offset = 0usize;
    let mut lines = text.split('\n').peekable();
    let mut line_idx = 0usize;

    while let Some(line) = lines.next() {
        let is_last = lines.peek().is_none();
        if line_idx == pos.line || is_last {
            let within: usize = line
                .chars()
                .take(pos.column)
                .map(char::len_utf8)
                .sum();
            return offset + within;
        }
        // +1 for the '\n' separator.
        offset += line.len() + 1;
        line_idx += 1;
    }

    offset
}

/// Convert a byte offset into `text` into a cursor position.
///
/// An offset that falls inside a multi-byte rune is floored to the start of that rune first.
pub fn to_line_column(text: &str, offset: usize) -> CursorPos {
    let offset = clamp_to_char_boundary(text, offset);
    let before = &text[..offset];

    let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
    CursorPos {
        line: before.matches('\n').count(),
        column: before[line_start..].chars().count(),
    }
}

/// Number of lines in `text` as the widget counts them (an empty buffer has one line, and a
/// trailing newline opens a new, empty line).
pub fn line_count(text: &str) -> usize {
    text.split('\n').count()
}

/// The last line of `text` (everything after the final `'\n'`).
pub fn last_line(text: &str) -> &str {
    text.rsplit('\n').next().unwrap_or_default()
}

/// Clamp `pos` to the nearest char boundary at or before it.
pub fn clamp_to_char_boundary(text: &str, pos: usize) -> usize {
    let mut p = pos.min(text.len());
    while p > 0 && !text.is_char_boundary(p) {
        p -= 1;
    }
    p
}

/// Byte offset of the char boundary immediately before `pos` (or 0).
pub fn prev_char_boundary(text: &str, pos: usize) -> usize {
    let pos = clamp_to_char_boundary(text, pos);
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}
