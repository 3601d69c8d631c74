use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::style::Stylize;

/// Styles used when drawing the composer.
///
/// The theme is a plain value handed to the composer at construction; nothing in the crate reads
/// colors from process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposerTheme {
    /// The `›` prompt while input is enabled.
    pub prompt: Style,
    /// The `›` prompt while input is disabled.
    pub prompt_disabled: Style,
    /// Placeholder tokens (`@paste-1`, `@notes.md`) inside the buffer.
    pub attachment: Style,
    /// History suggestion drawn after the input.
    pub ghost: Style,
    /// Hint shown when the buffer is empty, and the attachment summary row.
    pub hint: Style,
}

impl Default for ComposerTheme {
    fn default() -> Self {
        Self {
            prompt: Style::default().bold(),
            prompt_disabled: Style::default().dim(),
            attachment: Style::default().fg(Color::Cyan),
            ghost: Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
            hint: Style::default().dim(),
        }
    }
}

impl ComposerTheme {
    /// A theme with no colors or modifiers, for terminals (and tests) that want plain output.
    pub fn plain() -> Self {
        Self {
            prompt: Style::default(),
            prompt_disabled: Style::default(),
            attachment: Style::default(),
            ghost: Style::default(),
            hint: Style::default(),
        }
    }
}
