//! Inline history suggestions ("ghost text").
//!
//! The suggestion is pure display state. It is never written into the buffer except through
//! [`SuggestionState::take_for_accept`], and nothing scans it for placeholders.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

use super::position;

/// Where suggestions come from.
pub trait HistorySource {
    /// The most recent entry that starts with `prefix`.
    fn latest_match(&self, prefix: &str) -> Option<String>;

    /// Called with the literal text of every submission.
    fn record(&mut self, _text: &str) {}
}

/// Suffix that would complete the last line of `text`, if the history has one.
pub(crate) fn compute(text: &str, history: Option<&dyn HistorySource>) -> Option<String> {
    let line = position::last_line(text);
    if line.is_empty() {
        return None;
    }
    let candidate = history?.latest_match(line)?;
    if candidate.len() <= line.len() {
        return None;
    }
    candidate.strip_prefix(line).map(str::to_string)
}

#[derive(Debug, Default)]
pub(crate) struct SuggestionState {
    ghost: Option<String>,
}

impl SuggestionState {
    pub fn ghost(&self) -> Option<&str> {
        self.ghost.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.ghost.is_some()
    }

    pub fn recompute(&mut self, text: &str, history: Option<&dyn HistorySource>) {
        let next = compute(text, history);
        if next != self.ghost {
            tracing::trace!("suggestion changed: {:?} -> {:?}", self.ghost, next);
        }
        self.ghost = next;
    }

    pub fn dismiss(&mut self) {
        self.ghost = None;
    }

    /// Clear the suggestion and return the text to append to the buffer.
    pub fn take_for_accept(&mut self) -> Option<String> {
        self.ghost.take()
    }
}

/// Draw `ghost` starting at `pos`, clipped to the right edge of `area`. Only the first line of a
/// multi-line suggestion is drawn.
pub(crate) fn render_ghost(
    ghost: &str,
    pos: (u16, u16),
    area: Rect,
    buf: &mut Buffer,
    style: Style,
) {
    let (x, y) = pos;
    if y < area.y || y >= area.bottom() || x >= area.right() {
        return;
    }
    let first_line = ghost.split('\n').next().unwrap_or_default();
    buf.set_stringn(x, y, first_line, (area.right() - x) as usize, style);
}
