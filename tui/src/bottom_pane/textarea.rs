//! Multi-line text input widget.
//!
//! `TextArea` owns the composer buffer and implements the default, character-level editing
//! behavior (grapheme-aware cursor movement, deletion, emacs-style kills, word jumps). It knows
//! nothing about attachments: the composer intercepts placeholder-aware intents before they reach
//! [`TextArea::input`].
//!
//! The cursor is stored as a byte offset. The `(line, column)` view the composer works with is
//! derived through [`super::position`].

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use std::cell::Ref;
use std::cell::RefCell;
use std::ops::Range;
use textwrap::Options;
use textwrap::WordSplitter;
use unicode_segmentation::GraphemeCursor;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::position;
use super::position::CursorPos;

#[derive(Debug)]
pub(crate) struct TextArea {
    text: String,
    cursor_pos: usize,
    wrap_cache: RefCell<Option<WrapCache>>,
    preferred_col: Option<usize>,
}

/// One visual row produced by wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WrappedRow {
    /// Byte range of the row's content (never includes a `'\n'`).
    content: Range<usize>,
    /// Whether this row ends its logical line. The cursor may sit at `content.end` only on such
    /// rows; otherwise that position belongs to the next row.
    ends_line: bool,
}

impl WrappedRow {
    fn contains_cursor(&self, cursor: usize) -> bool {
        if self.ends_line {
            self.content.start <= cursor && cursor <= self.content.end
        } else {
            self.content.contains(&cursor)
        }
    }
}

#[derive(Debug, Clone)]
struct WrapCache {
    width: u16,
    rows: Vec<WrappedRow>,
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TextAreaState {
    /// Index into wrapped rows of the first visible row.
    scroll: u16,
}

impl TextArea {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor_pos: 0,
            wrap_cache: RefCell::new(None),
            preferred_col: None,
        }
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor_pos = position::clamp_to_char_boundary(&self.text, self.cursor_pos);
        self.wrap_cache.replace(None);
        self.preferred_col = None;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> usize {
        position::line_count(&self.text)
    }

    pub fn insert_str(&mut self, text: &str) {
        self.insert_str_at(self.cursor_pos, text);
    }

    pub fn insert_str_at(&mut self, pos: usize, text: &str) {
        let pos = position::clamp_to_char_boundary(&self.text, pos);
        self.text.insert_str(pos, text);
        self.wrap_cache.replace(None);
        if pos <= self.cursor_pos {
            self.cursor_pos += text.len();
        }
        self.preferred_col = None;
    }

    /// Replace `range` with `text`, keeping the cursor on a sensible position.
    pub fn replace_range(&mut self, range: Range<usize>, text: &str) {
        let start = position::clamp_to_char_boundary(&self.text, range.start);
        let end = position::clamp_to_char_boundary(&self.text, range.end.max(start));
        let removed_len = end - start;
        let inserted_len = text.len();
        if removed_len == 0 && inserted_len == 0 {
            return;
        }
        let diff = inserted_len as isize - removed_len as isize;

        self.text.replace_range(start..end, text);
        self.wrap_cache.replace(None);
        self.preferred_col = None;

        self.cursor_pos = if self.cursor_pos < start {
            self.cursor_pos
        } else if self.cursor_pos <= end {
            start + inserted_len
        } else {
            ((self.cursor_pos as isize) + diff) as usize
        }
        .min(self.text.len());
    }

    /// Cursor as a byte offset into [`TextArea::text`].
    pub fn cursor(&self) -> usize {
        self.cursor_pos
    }

    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor_pos = position::clamp_to_char_boundary(&self.text, pos);
        self.preferred_col = None;
    }

    /// Cursor as a `(line, rune column)` pair.
    pub fn cursor_position(&self) -> CursorPos {
        position::to_line_column(&self.text, self.cursor_pos)
    }

    /// Move the cursor to `(line, rune column)`, clamping to the buffer bounds.
    pub fn set_cursor_position(&mut self, pos: CursorPos) {
        self.set_cursor(position::to_byte_offset(&self.text, pos));
    }

    pub fn move_cursor_to_start(&mut self) {
        self.set_cursor(0);
    }

    pub fn move_cursor_to_end(&mut self) {
        self.set_cursor(self.text.len());
    }

    pub fn desired_height(&self, width: u16) -> u16 {
        self.wrapped_rows(width).len() as u16
    }

    /// Compute the on-screen cursor position taking scrolling into account.
    pub fn cursor_pos_with_state(&self, area: Rect, state: TextAreaState) -> Option<(u16, u16)> {
        let rows = self.wrapped_rows(area.width);
        let effective_scroll = self.effective_scroll(area.height, &rows, state.scroll);
        let idx = Self::row_index_for(&rows, self.cursor_pos)?;
        let row = &rows[idx];
        let col = self.text[row.content.start..self.cursor_pos].width() as u16;
        let screen_row = idx.checked_sub(effective_scroll as usize)?;
        if screen_row >= area.height as usize {
            return None;
        }
        Some((area.x + col, area.y + screen_row as u16))
    }

    /// Screen position immediately after the last rendered row's content, used to anchor overlays
    /// such as ghost text. Returns `None` when that row is scrolled out of view.
    pub fn end_of_content_pos(&self, area: Rect, state: TextAreaState) -> Option<(u16, u16)> {
        let rows = self.wrapped_rows(area.width);
        let effective_scroll = self.effective_scroll(area.height, &rows, state.scroll);
        let last_idx = rows.len().checked_sub(1)?;
        let row = &rows[last_idx];
        let col = self.text[row.content.clone()].width() as u16;
        let screen_row = last_idx.checked_sub(effective_scroll as usize)?;
        if screen_row >= area.height as usize {
            return None;
        }
        Some((area.x + col, area.y + screen_row as u16))
    }

    fn row_index_for(rows: &[WrappedRow], cursor: usize) -> Option<usize> {
        rows.iter()
            .position(|row| row.contains_cursor(cursor))
            .or_else(|| rows.iter().rposition(|row| row.content.start <= cursor))
    }

    fn current_display_col(&self) -> usize {
        let bol = self.beginning_of_current_line();
        self.text[bol..self.cursor_pos].width()
    }

    fn move_to_display_col_on_line(
        &mut self,
        line_start: usize,
        line_end: usize,
        target_col: usize,
    ) {
        let mut width_so_far = 0usize;
        for (i, g) in self.text[line_start..line_end].grapheme_indices(true) {
            width_so_far += g.width();
            if width_so_far > target_col {
                self.cursor_pos = line_start + i;
                return;
            }
        }
        self.cursor_pos = line_end;
    }

    fn beginning_of_line(&self, pos: usize) -> usize {
        self.text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn beginning_of_current_line(&self) -> usize {
        self.beginning_of_line(self.cursor_pos)
    }

    fn end_of_line(&self, pos: usize) -> usize {
        self.text[pos..]
            .find('\n')
            .map(|i| i + pos)
            .unwrap_or(self.text.len())
    }

    fn end_of_current_line(&self) -> usize {
        self.end_of_line(self.cursor_pos)
    }

    pub(crate) fn beginning_of_previous_word(&self) -> usize {
        let before = &self.text[..self.cursor_pos];
        let Some((last_non_ws, _)) = before.char_indices().rfind(|(_, c)| !c.is_whitespace())
        else {
            return 0;
        };
        before[..last_non_ws]
            .char_indices()
            .rfind(|(_, c)| c.is_whitespace())
            .map(|(idx, c)| idx + c.len_utf8())
            .unwrap_or(0)
    }

    pub(crate) fn end_of_next_word(&self) -> usize {
        let Some(first_non_ws) = self.text[self.cursor_pos..].find(|c: char| !c.is_whitespace())
        else {
            return self.text.len();
        };
        let word_start = self.cursor_pos + first_non_ws;
        match self.text[word_start..].find(char::is_whitespace) {
            Some(rel_idx) => word_start + rel_idx,
            None => self.text.len(),
        }
    }

    /// Apply the default behavior for `event`.
    pub fn input(&mut self, event: KeyEvent) {
        match event {
            KeyEvent {
                code: KeyCode::Char('j'),
                modifiers: KeyModifiers::CONTROL,
                ..
            }
            | KeyEvent {
                code: KeyCode::Enter,
                ..
            } => self.insert_str("\n"),
            KeyEvent {
                code: KeyCode::Char('h'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.delete_backward(1),
            KeyEvent {
                code: KeyCode::Char('d'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.delete_forward(1),
            KeyEvent {
                code: KeyCode::Backspace,
                modifiers,
                ..
            } if modifiers.contains(KeyModifiers::ALT) => self.delete_backward_word(),
            KeyEvent {
                code: KeyCode::Backspace,
                ..
            } => self.delete_backward(1),
            KeyEvent {
                code: KeyCode::Delete,
                ..
            } => self.delete_forward(1),
            KeyEvent {
                code: KeyCode::Char('w'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.delete_backward_word(),
            KeyEvent {
                code: KeyCode::Char('u'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.kill_to_beginning_of_line(),
            KeyEvent {
                code: KeyCode::Char('k'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.kill_to_end_of_line(),

            // Word movement.
            KeyEvent {
                code: KeyCode::Left,
                modifiers,
                ..
            } if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.set_cursor(self.beginning_of_previous_word());
            }
            KeyEvent {
                code: KeyCode::Char('b'),
                modifiers: KeyModifiers::ALT,
                ..
            } => self.set_cursor(self.beginning_of_previous_word()),
            KeyEvent {
                code: KeyCode::Right,
                modifiers,
                ..
            } if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.set_cursor(self.end_of_next_word());
            }
            KeyEvent {
                code: KeyCode::Char('f'),
                modifiers: KeyModifiers::ALT,
                ..
            } => self.set_cursor(self.end_of_next_word()),

            // Cursor movement.
            KeyEvent {
                code: KeyCode::Left,
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('b'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.move_cursor_left(),
            KeyEvent {
                code: KeyCode::Right,
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('f'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.move_cursor_right(),
            KeyEvent {
                code: KeyCode::Up, ..
            }
            | KeyEvent {
                code: KeyCode::Char('p'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.move_cursor_up(),
            KeyEvent {
                code: KeyCode::Down,
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('n'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.move_cursor_down(),
            KeyEvent {
                code: KeyCode::Home,
                ..
            } => self.move_cursor_to_beginning_of_line(false),
            KeyEvent {
                code: KeyCode::Char('a'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.move_cursor_to_beginning_of_line(true),
            KeyEvent {
                code: KeyCode::End, ..
            } => self.move_cursor_to_end_of_line(false),
            KeyEvent {
                code: KeyCode::Char('e'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => self.move_cursor_to_end_of_line(true),

            KeyEvent {
                code: KeyCode::Char(c),
                modifiers,
                ..
            } if !modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert_str(c.encode_utf8(&mut [0u8; 4]));
            }
            o => {
                tracing::debug!("Unhandled key event in TextArea: {o:?}");
            }
        }
    }

    // ####### Input Functions #######

    /// Delete `n` grapheme clusters before the cursor.
    pub fn delete_backward(&mut self, n: usize) {
        let mut start = self.cursor_pos;
        for _ in 0..n {
            match self.prev_grapheme_boundary(start) {
                Some(prev) => start = prev,
                None => break,
            }
        }
        self.replace_range(start..self.cursor_pos, "");
    }

    /// Delete `n` grapheme clusters after the cursor.
    pub fn delete_forward(&mut self, n: usize) {
        let mut end = self.cursor_pos;
        for _ in 0..n {
            match self.next_grapheme_boundary(end) {
                Some(next) => end = next,
                None => break,
            }
        }
        self.replace_range(self.cursor_pos..end, "");
    }

    pub fn delete_backward_word(&mut self) {
        self.replace_range(self.beginning_of_previous_word()..self.cursor_pos, "");
    }

    pub fn kill_to_end_of_line(&mut self) {
        let eol = self.end_of_current_line();
        if self.cursor_pos == eol {
            let next = (eol + 1).min(self.text.len());
            self.replace_range(self.cursor_pos..next, "");
        } else {
            self.replace_range(self.cursor_pos..eol, "");
        }
    }

    pub fn kill_to_beginning_of_line(&mut self) {
        let bol = self.beginning_of_current_line();
        if self.cursor_pos == bol {
            if bol > 0 {
                self.replace_range(bol - 1..bol, "");
            }
        } else {
            self.replace_range(bol..self.cursor_pos, "");
        }
    }

    fn prev_grapheme_boundary(&self, pos: usize) -> Option<usize> {
        if pos == 0 {
            return None;
        }
        let mut gc = GraphemeCursor::new(pos, self.text.len(), false);
        match gc.prev_boundary(&self.text, 0) {
            Ok(boundary) => boundary,
            Err(_) => Some(position::prev_char_boundary(&self.text, pos)),
        }
    }

    fn next_grapheme_boundary(&self, pos: usize) -> Option<usize> {
        if pos >= self.text.len() {
            return None;
        }
        let mut gc = GraphemeCursor::new(pos, self.text.len(), false);
        match gc.next_boundary(&self.text, 0) {
            Ok(boundary) => boundary,
            Err(_) => self.text[pos..]
                .chars()
                .next()
                .map(|ch| pos + ch.len_utf8()),
        }
    }

    /// Move the cursor left by a single grapheme cluster.
    pub fn move_cursor_left(&mut self) {
        self.cursor_pos = self.prev_grapheme_boundary(self.cursor_pos).unwrap_or(0);
        self.preferred_col = None;
    }

    /// Move the cursor right by a single grapheme cluster.
    pub fn move_cursor_right(&mut self) {
        self.cursor_pos = self
            .next_grapheme_boundary(self.cursor_pos)
            .unwrap_or(self.text.len());
        self.preferred_col = None;
    }

    pub fn move_cursor_up(&mut self) {
        if let Some(prev_nl) = self.text[..self.cursor_pos].rfind('\n') {
            let target_col = match self.preferred_col {
                Some(c) => c,
                None => {
                    let c = self.current_display_col();
                    self.preferred_col = Some(c);
                    c
                }
            };
            let prev_line_start = self.text[..prev_nl].rfind('\n').map(|i| i + 1).unwrap_or(0);
            self.move_to_display_col_on_line(prev_line_start, prev_nl, target_col);
        } else {
            self.cursor_pos = 0;
            self.preferred_col = None;
        }
    }

    pub fn move_cursor_down(&mut self) {
        let target_col = match self.preferred_col {
            Some(c) => c,
            None => {
                let c = self.current_display_col();
                self.preferred_col = Some(c);
                c
            }
        };
        if let Some(next_nl) = self.text[self.cursor_pos..]
            .find('\n')
            .map(|i| i + self.cursor_pos)
        {
            let next_line_start = next_nl + 1;
            let next_line_end = self.end_of_line(next_line_start);
            self.move_to_display_col_on_line(next_line_start, next_line_end, target_col);
        } else {
            self.cursor_pos = self.text.len();
            self.preferred_col = None;
        }
    }

    pub fn move_cursor_to_beginning_of_line(&mut self, move_up_at_bol: bool) {
        let bol = self.beginning_of_current_line();
        if move_up_at_bol && self.cursor_pos == bol {
            self.set_cursor(self.beginning_of_line(self.cursor_pos.saturating_sub(1)));
        } else {
            self.set_cursor(bol);
        }
    }

    pub fn move_cursor_to_end_of_line(&mut self, move_down_at_eol: bool) {
        let eol = self.end_of_current_line();
        if move_down_at_eol && self.cursor_pos == eol {
            let next_pos = (self.cursor_pos.saturating_add(1)).min(self.text.len());
            self.set_cursor(self.end_of_line(next_pos));
        } else {
            self.set_cursor(eol);
        }
    }

    fn wrapped_rows(&self, width: u16) -> Ref<'_, Vec<WrappedRow>> {
        {
            let mut cache = self.wrap_cache.borrow_mut();
            let needs_recalc = match cache.as_ref() {
                Some(c) => c.width != width,
                None => true,
            };
            if needs_recalc {
                *cache = Some(WrapCache {
                    width,
                    rows: wrap_rows(&self.text, width),
                });
            }
        }

        let cache = self.wrap_cache.borrow();
        Ref::map(cache, |c| match c.as_ref() {
            Some(cache) => &cache.rows,
            None => &EMPTY_ROWS,
        })
    }

    /// Calculate the scroll offset that keeps the cursor on screen, without scrolling when the
    /// content fits in the area.
    fn effective_scroll(&self, area_height: u16, rows: &[WrappedRow], current_scroll: u16) -> u16 {
        let total_rows = rows.len() as u16;
        if area_height >= total_rows {
            return 0;
        }

        let cursor_row_idx = Self::row_index_for(rows, self.cursor_pos).unwrap_or(0) as u16;

        let max_scroll = total_rows.saturating_sub(area_height);
        let mut scroll = current_scroll.min(max_scroll);

        if cursor_row_idx < scroll {
            scroll = cursor_row_idx;
        } else if cursor_row_idx >= scroll + area_height {
            scroll = cursor_row_idx + 1 - area_height;
        }
        scroll
    }

    /// Render the visible rows, drawing the byte ranges in `highlights` with `highlight_style`.
    pub fn render_with_highlights(
        &self,
        area: Rect,
        buf: &mut Buffer,
        state: &mut TextAreaState,
        highlights: &[Range<usize>],
        highlight_style: Style,
    ) {
        if area.is_empty() {
            return;
        }
        let rows = self.wrapped_rows(area.width);
        let scroll = self.effective_scroll(area.height, &rows, state.scroll);
        state.scroll = scroll;

        let start = scroll as usize;
        let end = (start + area.height as usize).min(rows.len());
        for (screen_row, row) in rows[start..end].iter().enumerate() {
            let y = area.y + screen_row as u16;
            let content = &self.text[row.content.clone()];
            buf.set_stringn(area.x, y, content, area.width as usize, Style::default());

            for highlight in highlights {
                let h_start = highlight.start.max(row.content.start);
                let h_end = highlight.end.min(row.content.end);
                if h_start >= h_end {
                    continue;
                }
                let offset = self.text[row.content.start..h_start].width() as u16;
                if offset >= area.width {
                    continue;
                }
                buf.set_stringn(
                    area.x + offset,
                    y,
                    &self.text[h_start..h_end],
                    (area.width - offset) as usize,
                    highlight_style,
                );
            }
        }
    }
}

static EMPTY_ROWS: Vec<WrappedRow> = Vec::new();

/// Wrap `text` into visual rows no wider than `width` columns.
///
/// Rows of one logical line are contiguous: each row starts where the previous one ended, so every
/// byte offset (and thus every cursor position) belongs to exactly one row.
fn wrap_rows(text: &str, width: u16) -> Vec<WrappedRow> {
    let options = Options::new(width.max(1) as usize)
        .wrap_algorithm(textwrap::WrapAlgorithm::FirstFit)
        .word_splitter(WordSplitter::NoHyphenation)
        .break_words(true);

    let mut rows = Vec::new();
    let mut line_start = 0usize;
    for line in text.split('\n') {
        let line_end = line_start + line.len();

        let mut starts = vec![line_start];
        let mut search_from = 0usize;
        for (idx, piece) in textwrap::wrap(line, &options).iter().enumerate() {
            let piece = piece.as_ref();
            let Some(rel) = line[search_from..].find(piece) else {
                continue;
            };
            let piece_start = search_from + rel;
            if idx > 0 && piece_start > 0 && !piece.is_empty() {
                starts.push(line_start + piece_start);
            }
            search_from = piece_start + piece.len();
        }
        starts.dedup();

        for (idx, start) in starts.iter().enumerate() {
            let next = starts.get(idx + 1).copied();
            rows.push(WrappedRow {
                content: *start..next.unwrap_or(line_end),
                ends_line: next.is_none(),
            });
        }

        line_start = line_end + 1;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ta_with(text: &str) -> TextArea {
        let mut t = TextArea::new();
        t.insert_str(text);
        t
    }

    #[test]
    fn insert_and_replace_update_cursor_and_text() {
        let mut t = ta_with("hello");
        t.set_cursor(5);
        t.insert_str("!");
        assert_eq!(t.text(), "hello!");
        assert_eq!(t.cursor(), 6);

        t.insert_str_at(0, "X");
        assert_eq!(t.text(), "Xhello!");
        assert_eq!(t.cursor(), 7);

        // Insert after the cursor should not move it.
        t.set_cursor(1);
        let end = t.text().len();
        t.insert_str_at(end, "Y");
        assert_eq!(t.text(), "Xhello!Y");
        assert_eq!(t.cursor(), 1);

        // Cursor before range.
        let mut t = ta_with("abcd");
        t.set_cursor(1);
        t.replace_range(2..3, "Z");
        assert_eq!(t.text(), "abZd");
        assert_eq!(t.cursor(), 1);

        // Cursor inside range.
        let mut t = ta_with("abcd");
        t.set_cursor(2);
        t.replace_range(1..3, "Q");
        assert_eq!(t.text(), "aQd");
        assert_eq!(t.cursor(), 2);

        // Cursor after range, shifted by the length diff.
        let mut t = ta_with("abcd");
        t.set_cursor(4);
        t.replace_range(0..1, "AA");
        assert_eq!(t.text(), "AAbcd");
        assert_eq!(t.cursor(), 5);
    }

    #[test]
    fn delete_backward_and_forward_edges() {
        let mut t = ta_with("abc");
        t.set_cursor(1);
        t.delete_backward(1);
        assert_eq!(t.text(), "bc");
        assert_eq!(t.cursor(), 0);

        t.set_cursor(0);
        t.delete_backward(1);
        assert_eq!(t.text(), "bc");
        assert_eq!(t.cursor(), 0);

        t.set_cursor(1);
        t.delete_forward(1);
        assert_eq!(t.text(), "b");
        assert_eq!(t.cursor(), 1);

        t.set_cursor(t.text().len());
        t.delete_forward(1);
        assert_eq!(t.text(), "b");
    }

    #[test]
    fn delete_backward_removes_whole_multibyte_grapheme() {
        let mut t = ta_with("aあ👍");
        t.delete_backward(1);
        assert_eq!(t.text(), "aあ");
        t.delete_backward(1);
        assert_eq!(t.text(), "a");
        assert_eq!(t.cursor(), 1);
    }

    #[test]
    fn delete_backward_word_and_kill_line_variants() {
        let mut t = ta_with("hello   world  ");
        t.set_cursor(t.text().len());
        t.delete_backward_word();
        assert_eq!(t.text(), "hello   ");
        assert_eq!(t.cursor(), 8);

        let mut t = ta_with("foo bar");
        t.set_cursor(6);
        t.delete_backward_word();
        assert_eq!(t.text(), "foo r");
        assert_eq!(t.cursor(), 4);

        let mut t = ta_with("abc\ndef");
        t.set_cursor(1);
        t.kill_to_end_of_line();
        assert_eq!(t.text(), "a\ndef");
        assert_eq!(t.cursor(), 1);

        let mut t = ta_with("abc\ndef");
        t.set_cursor(3);
        t.kill_to_end_of_line();
        assert_eq!(t.text(), "abcdef");
        assert_eq!(t.cursor(), 3);

        let mut t = ta_with("abc\ndef");
        t.set_cursor(5);
        t.kill_to_beginning_of_line();
        assert_eq!(t.text(), "abc\nef");

        let mut t = ta_with("abc\ndef");
        t.set_cursor(4);
        t.kill_to_beginning_of_line();
        assert_eq!(t.text(), "abcdef");
        assert_eq!(t.cursor(), 3);

        // Killing backwards at the very start is a no-op.
        let mut t = ta_with("abc");
        t.set_cursor(0);
        t.kill_to_beginning_of_line();
        assert_eq!(t.text(), "abc");
    }

    #[test]
    fn cursor_left_and_right_handle_graphemes() {
        let mut t = ta_with("a👍b");
        t.set_cursor(t.text().len());

        t.move_cursor_left();
        assert_eq!(t.cursor(), 5);
        t.move_cursor_left();
        assert_eq!(t.cursor(), 1);
        t.move_cursor_left();
        assert_eq!(t.cursor(), 0);
        t.move_cursor_left();
        assert_eq!(t.cursor(), 0);

        t.move_cursor_right();
        t.move_cursor_right();
        t.move_cursor_right();
        assert_eq!(t.cursor(), t.text().len());
    }

    #[test]
    fn line_column_cursor_api() {
        let mut t = ta_with("ab\nあい");
        assert_eq!(t.cursor_position(), CursorPos::new(1, 2));

        t.set_cursor_position(CursorPos::new(1, 1));
        assert_eq!(t.cursor(), 6);
        t.set_cursor_position(CursorPos::new(0, 10));
        assert_eq!(t.cursor(), 2);

        t.move_cursor_to_start();
        assert_eq!(t.cursor_position(), CursorPos::new(0, 0));
        t.move_cursor_to_end();
        assert_eq!(t.cursor_position(), CursorPos::new(1, 2));
        assert_eq!(t.line_count(), 2);
    }

    #[test]
    fn cursor_vertical_movement_across_lines_and_bounds() {
        let mut t = ta_with("short\nloooooooooong\nmid");
        let second_line_start = 6;
        t.set_cursor(second_line_start + 5);

        t.move_cursor_up();
        assert_eq!(t.cursor(), 5);

        t.move_cursor_up();
        assert_eq!(t.cursor(), 0);

        t.move_cursor_down();
        assert!(t.cursor() >= second_line_start);

        t.move_cursor_down();
        let third_line_start = t.text().find("mid").unwrap();
        assert!(t.cursor() >= third_line_start && t.cursor() <= third_line_start + 3);

        t.move_cursor_down();
        assert_eq!(t.cursor(), t.text().len());
    }

    #[test]
    fn home_end_and_emacs_style_home_end() {
        let mut t = ta_with("one\ntwo\nthree");
        let second_line_start = t.text().find("two").unwrap();
        t.set_cursor(second_line_start + 1);

        t.move_cursor_to_beginning_of_line(false);
        assert_eq!(t.cursor(), second_line_start);

        t.move_cursor_to_beginning_of_line(true);
        assert_eq!(t.cursor(), 0);

        t.move_cursor_to_end_of_line(false);
        assert_eq!(t.cursor(), 3);

        t.move_cursor_to_end_of_line(true);
        let end_second_nl = t.text().find("\nthree").unwrap();
        assert_eq!(t.cursor(), end_second_nl);
    }

    #[test]
    fn word_navigation_helpers() {
        let mut t = ta_with("  alpha  beta   gamma");
        let after_alpha = t.text().find("alpha").unwrap() + "alpha".len();
        t.set_cursor(after_alpha);
        assert_eq!(t.beginning_of_previous_word(), 2);

        let beta_start = t.text().find("beta").unwrap();
        t.set_cursor(beta_start);
        assert_eq!(t.end_of_next_word(), beta_start + "beta".len());

        t.set_cursor(t.text().len());
        assert_eq!(t.end_of_next_word(), t.text().len());
    }

    #[test]
    fn key_input_routes_to_default_behavior() {
        let mut t = TextArea::new();
        t.input(KeyEvent::new(KeyCode::Char('h'), KeyModifiers::NONE));
        t.input(KeyEvent::new(KeyCode::Char('I'), KeyModifiers::SHIFT));
        t.input(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        t.input(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert_eq!(t.text(), "hI\nx");

        t.input(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(t.text(), "hI\n");

        // Unbound control chords are ignored rather than inserted.
        t.input(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL));
        assert_eq!(t.text(), "hI\n");
    }

    #[test]
    fn wrapping_keeps_rows_contiguous() {
        let rows = wrap_rows("hello world here", 6);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].content.start, 0);
        for pair in rows.windows(2) {
            assert_eq!(pair[0].content.end, pair[1].content.start);
        }
        assert_eq!(rows.last().map(|r| r.content.end), Some(16));

        let rows = wrap_rows("a\n\nb", 10);
        let ranges: Vec<Range<usize>> = rows.iter().map(|r| r.content.clone()).collect();
        assert_eq!(ranges, vec![0..1, 2..2, 3..4]);
        assert!(rows.iter().all(|r| r.ends_line));
    }

    #[test]
    fn wrapping_and_cursor_positions() {
        let mut t = ta_with("hello world here");
        let area = Rect::new(0, 0, 6, 10);
        assert_eq!(t.desired_height(area.width), 3);

        let world_start = t.text().find("world").unwrap();
        t.set_cursor(world_start + 3);
        let (x, y) = t.cursor_pos_with_state(area, TextAreaState::default()).unwrap();
        assert_eq!((x, y), (3, 1));

        // With a one-row viewport the cursor row is scrolled into view.
        let mut state = TextAreaState::default();
        let small_area = Rect::new(0, 0, 6, 1);
        let (_x, y) = t.cursor_pos_with_state(small_area, state).unwrap();
        assert_eq!(y, 0);

        let mut buf = Buffer::empty(small_area);
        t.render_with_highlights(small_area, &mut buf, &mut state, &[], Style::default());
        assert_eq!(state.scroll, 1);
    }

    #[test]
    fn end_of_content_anchors_after_last_row() {
        let t = ta_with("ab\nあい");
        let area = Rect::new(2, 1, 20, 5);
        assert_eq!(
            t.end_of_content_pos(area, TextAreaState::default()),
            Some((6, 2))
        );
    }

    #[test]
    fn highlights_are_styled_in_place() {
        use ratatui::style::Color;

        let t = ta_with("see @paste-1 ok");
        let area = Rect::new(0, 0, 20, 1);
        let mut buf = Buffer::empty(area);
        let mut state = TextAreaState::default();
        let style = Style::default().fg(Color::Cyan);
        t.render_with_highlights(area, &mut buf, &mut state, &[4..12], style);

        assert_eq!(buf[(3, 0)].fg, Color::Reset);
        assert_eq!(buf[(4, 0)].symbol(), "@");
        assert_eq!(buf[(4, 0)].fg, Color::Cyan);
        assert_eq!(buf[(11, 0)].fg, Color::Cyan);
        assert_eq!(buf[(12, 0)].fg, Color::Reset);
    }
}
