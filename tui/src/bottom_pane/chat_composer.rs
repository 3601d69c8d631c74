//! The prompt composer: a `TextArea` plus attachments, paste buffering, history suggestions, and
//! submission.
//!
//! # Attachments
//!
//! Large pastes are written to a private temp file and represented in the buffer by an
//! `@paste-N` placeholder. Typing an `@path` token and then whitespace (or submitting with the
//! cursor on it) turns it into a file reference. Placeholders behave as single units: Left/Right
//! jump over them and Backspace/Delete remove them whole, releasing the backing file.
//!
//! After any other edit (word kills, line kills, replacing the buffer) the registry is reconciled
//! against the text, so an attachment never outlives its placeholder.
//!
//! # Suggestions
//!
//! After every mutation the last line of the buffer is matched against the history source. A hit
//! is drawn as dim ghost text after the input and hides the terminal cursor. Tab (or Right/End
//! with the cursor at the end of the buffer) accepts it; Esc dismisses it until the next edit.
//!
//! # Submission
//!
//! Enter without modifiers submits when input is enabled, no task is running, and the buffer is
//! non-empty. Every referenced attachment is read, all attachments are released, and the caller
//! receives a [`Submission`] with the literal text and the placeholder → content map.

use std::cell::RefCell;
use std::path::PathBuf;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use promptpad_protocol::Submission;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::WidgetRef;

use super::attachments::AttachmentRegistry;
use super::attachments::PlaceholderSpan;
use super::file_reference;
use super::paste;
use super::paste::InlinePasteLimits;
use super::paste::PasteDisposition;
use super::paste::PasteStore;
use super::position;
use super::position::CursorPos;
use super::suggestion;
use super::suggestion::HistorySource;
use super::suggestion::SuggestionState;
use super::textarea::TextArea;
use super::textarea::TextAreaState;
use crate::config::ComposerConfig;
use crate::prompt_history_store::PromptHistoryStore;
use crate::render::Insets;
use crate::render::RectExt as _;
use crate::render::renderable::InsetRenderable;
use crate::render::renderable::Renderable;
use crate::style::ComposerTheme;
use crate::ui_consts::LIVE_PREFIX_COLS;

/// Result returned when the user interacts with the text area.
#[derive(Debug, PartialEq)]
pub enum InputResult {
    Submitted(Submission),
    None,
}

/// The placeholder-aware part of a key event, derived once per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditIntent {
    MoveLeft,
    MoveRight,
    DeleteBackward,
    DeleteForward,
    None,
}

impl EditIntent {
    /// Mirrors the bindings in `TextArea::input`, so every key that moves by one rune or deletes
    /// one grapheme there is routed through the placeholder checks first.
    fn from_key(key_event: &KeyEvent) -> Self {
        let word_modifiers = KeyModifiers::CONTROL | KeyModifiers::ALT;
        match (key_event.code, key_event.modifiers) {
            (KeyCode::Left, modifiers) if !modifiers.intersects(word_modifiers) => Self::MoveLeft,
            (KeyCode::Char('b'), KeyModifiers::CONTROL) => Self::MoveLeft,
            (KeyCode::Right, modifiers) if !modifiers.intersects(word_modifiers) => {
                Self::MoveRight
            }
            (KeyCode::Char('f'), KeyModifiers::CONTROL) => Self::MoveRight,
            (KeyCode::Backspace, modifiers) if !modifiers.contains(KeyModifiers::ALT) => {
                Self::DeleteBackward
            }
            (KeyCode::Char('h'), KeyModifiers::CONTROL) => Self::DeleteBackward,
            (KeyCode::Delete, _) | (KeyCode::Char('d'), KeyModifiers::CONTROL) => {
                Self::DeleteForward
            }
            _ => Self::None,
        }
    }
}

pub struct ChatComposer {
    textarea: TextArea,
    textarea_state: RefCell<TextAreaState>,
    attachments: AttachmentRegistry,
    pastes: PasteStore,
    paste_limits: InlinePasteLimits,
    file_reference_root: PathBuf,
    history: Option<Box<dyn HistorySource>>,
    suggestion: SuggestionState,
    theme: ComposerTheme,
    placeholder_text: String,
    input_enabled: bool,
    input_disabled_placeholder: Option<String>,
    is_task_running: bool,
    has_user_typed: bool,
}

impl ChatComposer {
    pub fn new(
        config: &ComposerConfig,
        theme: ComposerTheme,
        history: Option<Box<dyn HistorySource>>,
    ) -> Self {
        Self {
            textarea: TextArea::new(),
            textarea_state: RefCell::new(TextAreaState::default()),
            attachments: AttachmentRegistry::new(),
            pastes: PasteStore::new(config.pastes_dir.clone()),
            paste_limits: InlinePasteLimits {
                max_lines: config.max_inline_paste_lines,
                max_chars: config.max_inline_paste_chars,
            },
            file_reference_root: config.file_reference_root.clone(),
            history,
            suggestion: SuggestionState::default(),
            theme,
            placeholder_text: config.placeholder_text.clone(),
            input_enabled: true,
            input_disabled_placeholder: None,
            is_task_running: false,
            has_user_typed: false,
        }
    }

    /// A composer whose suggestions come from (and whose submissions go to) the JSONL history
    /// at `config.history_path`.
    pub fn with_history_store(config: &ComposerConfig, theme: ComposerTheme) -> Self {
        let store = PromptHistoryStore::new_with_path(config.history_path.clone());
        Self::new(config, theme, Some(Box::new(store)))
    }

    fn layout_areas(&self, area: Rect) -> [Rect; 3] {
        let footer_height = self.attachment_footer().desired_height(area.width);
        let [composer_rect, footer_rect] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(footer_height)]).areas(area);
        let textarea_rect = composer_rect.inset(Insets::tlbr(1, LIVE_PREFIX_COLS, 1, 1));
        [composer_rect, textarea_rect, footer_rect]
    }

    /// Returns true if the composer currently contains no user input.
    pub fn is_empty(&self) -> bool {
        self.textarea.is_empty()
    }

    pub fn text(&self) -> &str {
        self.textarea.text()
    }

    pub fn cursor_position(&self) -> CursorPos {
        self.textarea.cursor_position()
    }

    pub fn set_cursor_position(&mut self, pos: CursorPos) {
        self.textarea.set_cursor_position(pos);
    }

    pub fn line_count(&self) -> usize {
        self.textarea.line_count()
    }

    pub fn attachments(&self) -> &AttachmentRegistry {
        &self.attachments
    }

    /// The ghost text currently offered, if any.
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.ghost()
    }

    /// Whether the user has edited the buffer since the last submission.
    pub fn has_user_typed(&self) -> bool {
        self.has_user_typed
    }

    pub fn set_task_running(&mut self, running: bool) {
        self.is_task_running = running;
    }

    pub fn set_input_enabled(&mut self, enabled: bool, placeholder: Option<String>) {
        self.input_enabled = enabled;
        self.input_disabled_placeholder = if enabled { None } else { placeholder };
    }

    /// Replace the buffer and move the cursor to the end. Attachments whose placeholder is not in
    /// `text` are released.
    pub fn set_text_content(&mut self, text: &str) {
        self.textarea.set_text(text);
        self.textarea.move_cursor_to_end();
        self.after_edit();
    }

    pub fn move_cursor_to_start(&mut self) {
        self.textarea.move_cursor_to_start();
    }

    pub fn move_cursor_to_end(&mut self) {
        self.textarea.move_cursor_to_end();
    }

    /// Insert `text` at the cursor.
    pub fn insert_str(&mut self, text: &str) {
        self.textarea.insert_str(text);
        self.after_edit();
    }

    /// Clear the buffer and release every attachment.
    pub fn clear(&mut self) {
        self.textarea.set_text("");
        self.attachments.clear();
        self.suggestion.dismiss();
    }

    /// Integrate pasted text into the composer.
    ///
    /// Small pastes are inserted verbatim. Pastes over either inline limit are written to a temp
    /// file and represented by an `@paste-N` placeholder. When that file cannot be written the
    /// paste is dropped with a warning; it is never inserted raw.
    pub fn handle_paste(&mut self, pasted: String) -> bool {
        if !self.input_enabled {
            return false;
        }
        match paste::classify(&pasted, self.paste_limits) {
            PasteDisposition::Inline(text) => self.textarea.insert_str(&text),
            PasteDisposition::Buffered(text) => {
                let attachment = match self.pastes.buffer(&text) {
                    Ok(attachment) => attachment,
                    Err(err) => {
                        tracing::warn!("dropping paste of {} bytes: {err}", text.len());
                        return false;
                    }
                };
                let placeholder = attachment.placeholder().to_string();
                if self.attachments.add(attachment).is_none() {
                    return false;
                }
                self.textarea.insert_str(&placeholder);
            }
        }
        self.has_user_typed = true;
        self.after_edit();
        true
    }

    /// Handle a key event coming from the main UI.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        if !self.input_enabled || key_event.kind == KeyEventKind::Release {
            return (InputResult::None, false);
        }

        if self.suggestion.is_active()
            && let Some(handled) = self.handle_suggestion_key(&key_event)
        {
            return (InputResult::None, handled);
        }

        match key_event {
            KeyEvent {
                code: KeyCode::Enter,
                modifiers: KeyModifiers::NONE,
                ..
            } => self.handle_submission(),
            tab_event @ KeyEvent {
                code: KeyCode::Tab,
                modifiers: KeyModifiers::NONE,
                ..
            } => self.handle_input_basic(KeyEvent {
                code: KeyCode::Char('\t'),
                ..tab_event
            }),
            input => self.handle_input_basic(input),
        }
    }

    /// Keys with a meaning only while a suggestion is shown. Returns `None` to let the key through.
    fn handle_suggestion_key(&mut self, key_event: &KeyEvent) -> Option<bool> {
        if key_event.modifiers != KeyModifiers::NONE {
            return None;
        }
        let at_end = self.textarea.cursor() == self.textarea.text().len();
        match key_event.code {
            KeyCode::Tab => Some(self.accept_suggestion()),
            KeyCode::Right | KeyCode::End if at_end => Some(self.accept_suggestion()),
            KeyCode::Esc => {
                self.suggestion.dismiss();
                Some(true)
            }
            _ => None,
        }
    }

    /// Append the suggested suffix to the buffer. This is the only way ghost text becomes real
    /// text.
    pub fn accept_suggestion(&mut self) -> bool {
        let Some(suffix) = self.suggestion.take_for_accept() else {
            return false;
        };
        self.textarea.move_cursor_to_end();
        self.textarea.insert_str(&suffix);
        self.has_user_typed = true;
        self.after_edit();
        true
    }

    fn handle_input_basic(&mut self, input: KeyEvent) -> (InputResult, bool) {
        let intent = EditIntent::from_key(&input);
        if self.apply_atomic_intent(intent) {
            return (InputResult::None, true);
        }

        if inserts_whitespace(&input) {
            self.finalize_file_reference_before_cursor();
        }

        let before = self.textarea.text().to_string();
        self.textarea.input(input);
        if self.textarea.text() != before {
            self.has_user_typed = true;
            self.after_edit();
        }
        (InputResult::None, true)
    }

    /// Placeholder-aware handling of `intent`. Returns `false` when no placeholder touches the
    /// cursor and the default behavior should run instead.
    fn apply_atomic_intent(&mut self, intent: EditIntent) -> bool {
        let text = self.textarea.text();
        let cursor = self.textarea.cursor();

        match intent {
            EditIntent::None => false,
            EditIntent::MoveLeft => {
                let Some(span) = self.attachments.find_before(text, cursor) else {
                    return false;
                };
                let target = position::prev_char_boundary(text, span.range.start);
                self.textarea.set_cursor(target);
                true
            }
            EditIntent::MoveRight => {
                let Some(span) = self.attachments.find_after(text, cursor) else {
                    return false;
                };
                self.textarea.set_cursor(span.range.end);
                true
            }
            EditIntent::DeleteBackward => {
                let Some(span) = self.attachments.find_before(text, cursor) else {
                    return false;
                };
                self.excise_placeholder(span);
                true
            }
            EditIntent::DeleteForward => {
                let Some(span) = self.attachments.find_after(text, cursor) else {
                    return false;
                };
                self.excise_placeholder(span);
                true
            }
        }
    }

    fn excise_placeholder(&mut self, span: PlaceholderSpan) {
        let start = span.range.start;
        self.textarea.replace_range(span.range, "");
        self.textarea.set_cursor(start);
        // The same placeholder text may still occur elsewhere in the buffer.
        let still_present = self
            .attachments
            .spans(self.textarea.text())
            .iter()
            .any(|other| other.id == span.id);
        if !still_present {
            self.attachments.remove(span.id);
        }
        self.has_user_typed = true;
        self.recompute_suggestion();
    }

    /// Turn the `@path` token ending at the cursor into a file reference.
    fn finalize_file_reference_before_cursor(&mut self) {
        let cursor = self.textarea.cursor();
        if let Some(range) = file_reference::token_at(self.textarea.text(), cursor)
            && range.end == cursor
        {
            self.finalize_file_reference(range);
        }
    }

    fn finalize_file_reference(&mut self, range: std::ops::Range<usize>) {
        let token = &self.textarea.text()[range];
        if !file_reference::is_candidate(token) || self.attachments.contains_placeholder(token) {
            return;
        }
        match file_reference::resolve(token, &self.file_reference_root) {
            Ok(attachment) => {
                tracing::debug!("attached file reference {}", attachment.path().display());
                self.attachments.add(attachment);
            }
            Err(err) => tracing::debug!("ignoring file reference {token}: {err}"),
        }
    }

    fn handle_submission(&mut self) -> (InputResult, bool) {
        if self.is_task_running || self.textarea.is_empty() {
            return (InputResult::None, false);
        }

        if let Some(range) =
            file_reference::token_at(self.textarea.text(), self.textarea.cursor())
        {
            self.finalize_file_reference(range);
        }

        let text = self.textarea.text().to_string();
        let attachments = self.attachments.resolve_and_clear(&text);
        self.textarea.set_text("");
        self.has_user_typed = false;
        self.suggestion.dismiss();
        if let Some(history) = self.history.as_mut() {
            history.record(&text);
        }
        (
            InputResult::Submitted(Submission::new(text, attachments)),
            true,
        )
    }

    /// Bookkeeping shared by every edit that bypassed the atomic placeholder path.
    fn after_edit(&mut self) {
        let removed = self.attachments.retain_present(self.textarea.text());
        if removed > 0 {
            tracing::debug!("released {removed} attachment(s) whose placeholder was edited away");
        }
        self.recompute_suggestion();
    }

    fn recompute_suggestion(&mut self) {
        self.suggestion
            .recompute(self.textarea.text(), self.history.as_deref());
    }

    fn attachment_footer(&self) -> Option<InsetRenderable<'static>> {
        if self.attachments.is_empty() {
            return None;
        }
        let labels: Vec<String> = self
            .attachments
            .iter()
            .map(|(_, attachment)| attachment.label().to_string())
            .collect();
        let line = Line::from(Span::styled(labels.join("  "), self.theme.hint));
        Some(InsetRenderable::new(
            line,
            Insets::tlbr(0, LIVE_PREFIX_COLS, 0, 0),
        ))
    }
}

/// Whether `key_event` would insert whitespace through the default path.
fn inserts_whitespace(key_event: &KeyEvent) -> bool {
    match key_event.code {
        KeyCode::Char('j') if key_event.modifiers == KeyModifiers::CONTROL => true,
        KeyCode::Char(c) => {
            c.is_whitespace()
                && !key_event
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        }
        KeyCode::Enter => true,
        _ => false,
    }
}

impl Renderable for ChatComposer {
    fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        // Ghost text and the terminal cursor are never shown together.
        if !self.input_enabled || self.suggestion.is_active() {
            return None;
        }

        let [_, textarea_rect, _] = self.layout_areas(area);
        let state = *self.textarea_state.borrow();
        self.textarea.cursor_pos_with_state(textarea_rect, state)
    }

    fn desired_height(&self, width: u16) -> u16 {
        const COLS_WITH_MARGIN: u16 = LIVE_PREFIX_COLS + 1;
        self.textarea
            .desired_height(width.saturating_sub(COLS_WITH_MARGIN))
            + 2
            + self.attachment_footer().desired_height(width)
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let [_, textarea_rect, footer_rect] = self.layout_areas(area);
        self.attachment_footer().render(footer_rect, buf);

        if textarea_rect.is_empty() {
            return;
        }
        let prompt_style = if self.input_enabled {
            self.theme.prompt
        } else {
            self.theme.prompt_disabled
        };
        buf.set_span(
            textarea_rect.x - LIVE_PREFIX_COLS,
            textarea_rect.y,
            &Span::styled("›", prompt_style),
            textarea_rect.width,
        );

        let highlights: Vec<_> = self
            .attachments
            .spans(self.textarea.text())
            .into_iter()
            .map(|span| span.range)
            .collect();
        let mut state = self.textarea_state.borrow_mut();
        self.textarea.render_with_highlights(
            textarea_rect,
            buf,
            &mut state,
            &highlights,
            self.theme.attachment,
        );

        if self.textarea.is_empty() {
            let text = if self.input_enabled {
                self.placeholder_text.as_str()
            } else {
                self.input_disabled_placeholder
                    .as_deref()
                    .unwrap_or("Input disabled.")
            };
            Line::from(Span::styled(text, self.theme.hint)).render_ref(textarea_rect, buf);
        }

        if self.input_enabled
            && let Some(ghost) = self.suggestion.ghost()
            && let Some(pos) = self.textarea.end_of_content_pos(textarea_rect, *state)
        {
            suggestion::render_ghost(ghost, pos, textarea_rect, buf, self.theme.ghost);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::path::Path;
    use tempfile::TempDir;
    use tempfile::tempdir;

    /// Lines pasted by tests that should be buffered (more than `max_inline_paste_lines`).
    const BIG_PASTE: &str = "line\nline\nline\nline\n";

    fn test_config(dir: &Path) -> ComposerConfig {
        ComposerConfig {
            max_inline_paste_lines: 3,
            max_inline_paste_chars: 40,
            pastes_dir: dir.join("pastes"),
            history_path: None,
            file_reference_root: dir.to_path_buf(),
            placeholder_text: "Ask anything".to_string(),
        }
    }

    fn composer(dir: &TempDir) -> ChatComposer {
        ChatComposer::new(&test_config(dir.path()), ComposerTheme::plain(), None)
    }

    struct FixedHistory(Vec<&'static str>);

    impl HistorySource for FixedHistory {
        fn latest_match(&self, prefix: &str) -> Option<String> {
            self.0
                .iter()
                .rev()
                .find(|entry| entry.starts_with(prefix))
                .map(ToString::to_string)
        }
    }

    fn press(composer: &mut ChatComposer, code: KeyCode) -> InputResult {
        composer
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .0
    }

    fn type_str(composer: &mut ChatComposer, text: &str) {
        for ch in text.chars() {
            press(composer, KeyCode::Char(ch));
        }
    }

    fn temp_paths(composer: &ChatComposer) -> Vec<PathBuf> {
        composer
            .attachments()
            .iter()
            .filter(|(_, attachment)| attachment.is_temporary())
            .map(|(_, attachment)| attachment.path().to_path_buf())
            .collect()
    }

    fn placeholders(composer: &ChatComposer) -> Vec<String> {
        composer
            .attachments()
            .iter()
            .map(|(_, attachment)| attachment.placeholder().to_string())
            .collect()
    }

    fn rendered_rows(composer: &ChatComposer, width: u16) -> String {
        let height = composer.desired_height(width);
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        composer.render(area, &mut buf);
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .filter(|row| !row.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn small_paste_is_inserted_inline() {
        let dir = tempdir().expect("tempdir");
        let mut composer = composer(&dir);

        assert!(composer.handle_paste("a\r\nb".to_string()));
        assert_eq!(composer.text(), "a\nb");
        assert!(composer.attachments().is_empty());
        assert!(composer.has_user_typed());
    }

    #[test]
    fn large_paste_becomes_placeholder_backed_by_temp_file() {
        let dir = tempdir().expect("tempdir");
        let mut composer = composer(&dir);
        type_str(&mut composer, "see ");

        assert!(composer.handle_paste(BIG_PASTE.to_string()));
        assert_eq!(composer.text(), "see @paste-1");
        let paths = temp_paths(&composer);
        assert_eq!(paths.len(), 1);
        assert!(paths[0].starts_with(dir.path().join("pastes")));
        assert_eq!(
            std::fs::read_to_string(&paths[0]).expect("read paste"),
            BIG_PASTE
        );
    }

    #[test]
    fn paste_numbers_are_never_reused() {
        let dir = tempdir().expect("tempdir");
        let mut composer = composer(&dir);

        for _ in 0..3 {
            composer.handle_paste(BIG_PASTE.to_string());
            type_str(&mut composer, " ");
        }
        assert_eq!(composer.text(), "@paste-1 @paste-2 @paste-3 ");

        // Put the cursor right after `@paste-2` and delete it.
        composer.set_cursor_position(CursorPos::new(0, 17));
        press(&mut composer, KeyCode::Backspace);
        assert_eq!(composer.text(), "@paste-1  @paste-3 ");
        assert_eq!(placeholders(&composer), vec!["@paste-1", "@paste-3"]);

        composer.set_cursor_position(CursorPos::new(0, 100));
        composer.handle_paste(BIG_PASTE.to_string());
        assert_eq!(composer.text(), "@paste-1  @paste-3 @paste-4");
    }

    #[test]
    fn modified_delete_keys_remove_whole_placeholders() {
        let dir = tempdir().expect("tempdir");
        let mut composer = composer(&dir);

        for modifiers in [KeyModifiers::SHIFT, KeyModifiers::CONTROL] {
            composer.handle_paste(BIG_PASTE.to_string());
            let paths = temp_paths(&composer);
            composer.handle_key_event(KeyEvent::new(KeyCode::Backspace, modifiers));
            assert_eq!(composer.text(), "");
            assert!(composer.attachments().is_empty());
            assert!(!paths[0].exists());
        }

        composer.handle_paste(BIG_PASTE.to_string());
        composer.move_cursor_to_start();
        composer.handle_key_event(KeyEvent::new(KeyCode::Delete, KeyModifiers::SHIFT));
        assert_eq!(composer.text(), "");
        assert!(composer.attachments().is_empty());
    }

    #[test]
    fn shifted_arrows_step_over_placeholders() {
        let dir = tempdir().expect("tempdir");
        let mut composer = composer(&dir);
        type_str(&mut composer, "a");
        composer.handle_paste(BIG_PASTE.to_string());
        assert_eq!(composer.text(), "a@paste-1");

        composer.handle_key_event(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT));
        assert_eq!(composer.cursor_position(), CursorPos::new(0, 0));
        composer.set_cursor_position(CursorPos::new(0, 1));
        composer.handle_key_event(KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT));
        assert_eq!(composer.cursor_position(), CursorPos::new(0, 9));

        type_str(&mut composer, "x");
        assert_eq!(composer.text(), "a@paste-1x");
        assert_eq!(placeholders(&composer), vec!["@paste-1"]);
    }

    #[test]
    fn failed_paste_buffering_drops_the_paste() {
        let dir = tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").expect("write blocker");
        let mut config = test_config(dir.path());
        config.pastes_dir = blocker.join("pastes");
        let mut composer = ChatComposer::new(&config, ComposerTheme::plain(), None);
        type_str(&mut composer, "keep");

        assert!(!composer.handle_paste(BIG_PASTE.to_string()));
        assert_eq!(composer.text(), "keep");
        assert!(composer.attachments().is_empty());
    }

    #[test]
    fn backspace_removes_whole_placeholder_from_any_inner_position() {
        let dir = tempdir().expect("tempdir");
        // "ab@paste-1": the placeholder spans bytes 2..10.
        for cursor in 3..=10 {
            let mut composer = composer(&dir);
            type_str(&mut composer, "ab");
            composer.handle_paste(BIG_PASTE.to_string());
            let paths = temp_paths(&composer);

            composer.set_cursor_position(CursorPos::new(0, cursor));
            press(&mut composer, KeyCode::Backspace);

            assert_eq!(composer.text(), "ab", "cursor {cursor}");
            assert_eq!(composer.cursor_position(), CursorPos::new(0, 2));
            assert!(composer.attachments().is_empty());
            assert!(paths.iter().all(|path| !path.exists()));
        }
    }

    #[test]
    fn backspace_at_placeholder_start_uses_default_behavior() {
        let dir = tempdir().expect("tempdir");
        let mut composer = composer(&dir);
        type_str(&mut composer, "ab");
        composer.handle_paste(BIG_PASTE.to_string());

        composer.set_cursor_position(CursorPos::new(0, 2));
        press(&mut composer, KeyCode::Backspace);
        assert_eq!(composer.text(), "a@paste-1");
        assert_eq!(placeholders(&composer), vec!["@paste-1"]);
    }

    #[test]
    fn delete_forward_removes_whole_placeholder() {
        let dir = tempdir().expect("tempdir");
        for cursor in 2..10 {
            let mut composer = composer(&dir);
            type_str(&mut composer, "ab");
            composer.handle_paste(BIG_PASTE.to_string());
            type_str(&mut composer, "!");

            composer.set_cursor_position(CursorPos::new(0, cursor));
            press(&mut composer, KeyCode::Delete);

            assert_eq!(composer.text(), "ab!", "cursor {cursor}");
            assert_eq!(composer.cursor_position(), CursorPos::new(0, 2));
            assert!(composer.attachments().is_empty());
        }
    }

    #[test]
    fn right_from_inside_placeholder_lands_on_its_end() {
        let dir = tempdir().expect("tempdir");
        for cursor in 2..10 {
            let mut composer = composer(&dir);
            type_str(&mut composer, "ab");
            composer.handle_paste(BIG_PASTE.to_string());
            type_str(&mut composer, "cd");

            composer.set_cursor_position(CursorPos::new(0, cursor));
            press(&mut composer, KeyCode::Right);
            assert_eq!(composer.cursor_position(), CursorPos::new(0, 10));
        }
    }

    #[test]
    fn left_jumps_to_one_rune_before_placeholder() {
        let dir = tempdir().expect("tempdir");
        let mut composer = composer(&dir);
        type_str(&mut composer, "aあ");
        composer.handle_paste(BIG_PASTE.to_string());

        press(&mut composer, KeyCode::Left);
        assert_eq!(composer.cursor_position(), CursorPos::new(0, 1));

        // At the very start of the buffer the jump clamps to 0.
        let mut composer = ChatComposer::new(&test_config(dir.path()), ComposerTheme::plain(), None);
        composer.handle_paste(BIG_PASTE.to_string());
        press(&mut composer, KeyCode::Left);
        assert_eq!(composer.cursor_position(), CursorPos::new(0, 0));
    }

    #[test]
    fn plain_text_keeps_default_navigation() {
        let dir = tempdir().expect("tempdir");
        let mut composer = composer(&dir);
        type_str(&mut composer, "abc");
        press(&mut composer, KeyCode::Left);
        assert_eq!(composer.cursor_position(), CursorPos::new(0, 2));
        press(&mut composer, KeyCode::Backspace);
        assert_eq!(composer.text(), "ac");
    }

    #[test]
    fn line_kill_releases_orphaned_attachment() {
        let dir = tempdir().expect("tempdir");
        let mut composer = composer(&dir);
        composer.handle_paste(BIG_PASTE.to_string());
        let paths = temp_paths(&composer);

        composer.handle_key_event(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(composer.text(), "");
        assert!(composer.attachments().is_empty());
        assert!(paths.iter().all(|path| !path.exists()));

        type_str(&mut composer, "hi");
        let InputResult::Submitted(submission) = press(&mut composer, KeyCode::Enter) else {
            panic!("expected submission");
        };
        assert_eq!(submission, Submission::new("hi", BTreeMap::new()));
    }

    #[test]
    fn submission_resolves_pastes_and_file_references() {
        let dir = tempdir().expect("tempdir");
        let notes = dir.path().join("notes.md");
        std::fs::write(&notes, "# notes\n").expect("write notes");
        let mut composer = composer(&dir);

        type_str(&mut composer, "see ");
        composer.handle_paste(BIG_PASTE.to_string());
        type_str(&mut composer, " and @notes.md");
        let paste_paths = temp_paths(&composer);

        let (result, needs_redraw) =
            composer.handle_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(needs_redraw);

        let mut expected = BTreeMap::new();
        expected.insert("@notes.md".to_string(), "# notes\n".to_string());
        expected.insert("@paste-1".to_string(), BIG_PASTE.to_string());
        assert_eq!(
            result,
            InputResult::Submitted(Submission::new("see @paste-1 and @notes.md", expected))
        );

        assert!(composer.is_empty());
        assert!(composer.attachments().is_empty());
        assert!(!composer.has_user_typed());
        assert!(paste_paths.iter().all(|path| !path.exists()));
        assert_eq!(
            std::fs::read_to_string(&notes).expect("notes untouched"),
            "# notes\n"
        );
    }

    #[test]
    fn file_reference_is_finalized_when_whitespace_follows() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(dir.path().join("notes.md"), "hello").expect("write notes");
        std::fs::create_dir(dir.path().join("src.d")).expect("mkdir");
        let mut composer = composer(&dir);

        type_str(&mut composer, "@notes.md @src.d @missing.md @mention ");
        assert_eq!(placeholders(&composer), vec!["@notes.md"]);
        let attachment = composer
            .attachments()
            .iter()
            .next()
            .map(|(_, attachment)| attachment.label().to_string());
        assert_eq!(attachment.as_deref(), Some("notes.md (5 B)"));

        // Deleting the reference releases it without touching the file.
        composer.set_cursor_position(CursorPos::new(0, 9));
        press(&mut composer, KeyCode::Backspace);
        assert!(composer.attachments().is_empty());
        assert!(dir.path().join("notes.md").exists());
    }

    #[test]
    fn submit_is_a_noop_when_empty_or_busy() {
        let dir = tempdir().expect("tempdir");
        let mut composer = composer(&dir);
        assert_eq!(press(&mut composer, KeyCode::Enter), InputResult::None);

        type_str(&mut composer, "hello");
        composer.set_task_running(true);
        assert_eq!(press(&mut composer, KeyCode::Enter), InputResult::None);
        assert_eq!(composer.text(), "hello");

        composer.set_task_running(false);
        assert!(matches!(
            press(&mut composer, KeyCode::Enter),
            InputResult::Submitted(_)
        ));
    }

    #[test]
    fn modified_enter_inserts_newline() {
        let dir = tempdir().expect("tempdir");
        let mut composer = composer(&dir);
        type_str(&mut composer, "a");
        composer.handle_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        type_str(&mut composer, "b");
        assert_eq!(composer.text(), "a\nb");
        assert_eq!(composer.line_count(), 2);
    }

    #[test]
    fn disabled_input_ignores_keys_and_pastes() {
        let dir = tempdir().expect("tempdir");
        let mut composer = composer(&dir);
        composer.set_input_enabled(false, Some("Working...".to_string()));

        assert_eq!(
            composer.handle_key_event(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE)),
            (InputResult::None, false)
        );
        assert!(!composer.handle_paste("x".to_string()));
        assert!(composer.is_empty());
    }

    #[test]
    fn suggestion_hides_cursor_and_is_accepted_with_tab() {
        let dir = tempdir().expect("tempdir");
        let history = FixedHistory(vec!["git status", "git stash pop"]);
        let mut composer = ChatComposer::new(
            &test_config(dir.path()),
            ComposerTheme::plain(),
            Some(Box::new(history)),
        );
        let area = Rect::new(0, 0, 40, 3);

        type_str(&mut composer, "git st");
        assert_eq!(composer.suggestion(), Some("ash pop"));
        assert_eq!(composer.text(), "git st");
        assert_eq!(composer.cursor_pos(area), None);

        press(&mut composer, KeyCode::Tab);
        assert_eq!(composer.text(), "git stash pop");
        assert_eq!(composer.suggestion(), None);
        assert_eq!(composer.cursor_pos(area), Some((15, 1)));
    }

    #[test]
    fn right_accepts_only_at_end_and_esc_dismisses() {
        let dir = tempdir().expect("tempdir");
        let history = FixedHistory(vec!["hello world"]);
        let mut composer = ChatComposer::new(
            &test_config(dir.path()),
            ComposerTheme::plain(),
            Some(Box::new(history)),
        );

        type_str(&mut composer, "hel");
        press(&mut composer, KeyCode::Left);
        press(&mut composer, KeyCode::Right);
        assert_eq!(composer.text(), "hel");
        assert_eq!(composer.suggestion(), Some("lo world"));

        press(&mut composer, KeyCode::Esc);
        assert_eq!(composer.suggestion(), None);
        assert_eq!(composer.text(), "hel");

        // The next edit brings it back; Right at the end accepts.
        type_str(&mut composer, "l");
        press(&mut composer, KeyCode::Right);
        assert_eq!(composer.text(), "hello world");
    }

    #[test]
    fn clearing_the_buffer_clears_the_suggestion() {
        let dir = tempdir().expect("tempdir");
        let history = FixedHistory(vec!["hello world"]);
        let mut composer = ChatComposer::new(
            &test_config(dir.path()),
            ComposerTheme::plain(),
            Some(Box::new(history)),
        );

        type_str(&mut composer, "hello");
        assert!(composer.suggestion().is_some());

        composer.set_text_content("");
        assert_eq!(composer.suggestion(), None);
        assert_eq!(composer.cursor_pos(Rect::new(0, 0, 40, 3)), Some((2, 1)));
    }

    #[test]
    fn submissions_are_recorded_in_history() {
        let dir = tempdir().expect("tempdir");
        let mut config = test_config(dir.path());
        config.history_path = Some(dir.path().join("history.jsonl"));
        let mut composer = ChatComposer::with_history_store(&config, ComposerTheme::plain());

        type_str(&mut composer, "cargo test --workspace");
        press(&mut composer, KeyCode::Enter);

        type_str(&mut composer, "cargo t");
        assert_eq!(composer.suggestion(), Some("est --workspace"));
        assert!(dir.path().join("history.jsonl").exists());
    }

    #[test]
    fn dropping_the_composer_releases_paste_files() {
        let dir = tempdir().expect("tempdir");
        let mut composer = composer(&dir);
        composer.handle_paste(BIG_PASTE.to_string());
        let paths = temp_paths(&composer);
        assert!(paths.iter().all(|path| path.exists()));

        drop(composer);
        assert!(paths.iter().all(|path| !path.exists()));
    }

    #[test]
    fn renders_prompt_text_and_attachment_summary() {
        let dir = tempdir().expect("tempdir");
        let mut composer = composer(&dir);
        type_str(&mut composer, "see ");
        composer.handle_paste(BIG_PASTE.to_string());

        assert_snapshot!(rendered_rows(&composer, 30), @r"
        › see @paste-1
          paste-1 (20 B)
        ");
    }

    #[test]
    fn renders_placeholder_hint_when_empty() {
        let dir = tempdir().expect("tempdir");
        let composer = composer(&dir);
        assert_eq!(rendered_rows(&composer, 30), "› Ask anything");
    }

    #[test]
    fn renders_ghost_text_after_input() {
        let dir = tempdir().expect("tempdir");
        let history = FixedHistory(vec!["hello world"]);
        let mut composer = ChatComposer::new(
            &test_config(dir.path()),
            ComposerTheme::plain(),
            Some(Box::new(history)),
        );
        type_str(&mut composer, "hel");

        assert_eq!(rendered_rows(&composer, 30), "› hello world");
    }

    #[test]
    fn placeholder_spans_are_highlighted() {
        use ratatui::style::Color;

        let dir = tempdir().expect("tempdir");
        let mut composer = composer(&dir);
        composer.theme = ComposerTheme::default();
        type_str(&mut composer, "a ");
        composer.handle_paste(BIG_PASTE.to_string());

        let area = Rect::new(0, 0, 30, composer.desired_height(30));
        let mut buf = Buffer::empty(area);
        composer.render(area, &mut buf);

        // Text starts after the two prompt columns on row 1.
        assert_eq!(buf[(2, 1)].fg, Color::Reset);
        assert_eq!(buf[(4, 1)].symbol(), "@");
        assert_eq!(buf[(4, 1)].fg, Color::Cyan);
        assert_eq!(buf[(11, 1)].fg, Color::Cyan);
    }

    #[test]
    fn intent_is_derived_from_plain_and_emacs_keys() {
        let intent = |code, modifiers| EditIntent::from_key(&KeyEvent::new(code, modifiers));
        assert_eq!(intent(KeyCode::Left, KeyModifiers::NONE), EditIntent::MoveLeft);
        assert_eq!(
            intent(KeyCode::Char('f'), KeyModifiers::CONTROL),
            EditIntent::MoveRight
        );
        assert_eq!(
            intent(KeyCode::Char('h'), KeyModifiers::CONTROL),
            EditIntent::DeleteBackward
        );
        assert_eq!(
            intent(KeyCode::Delete, KeyModifiers::NONE),
            EditIntent::DeleteForward
        );
        assert_eq!(intent(KeyCode::Left, KeyModifiers::ALT), EditIntent::None);
        assert_eq!(intent(KeyCode::Char('x'), KeyModifiers::NONE), EditIntent::None);
    }
}
