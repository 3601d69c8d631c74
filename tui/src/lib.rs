//! Attachment-aware prompt composer for ratatui applications.
//!
//! The crate renders into a caller-provided [`ratatui::buffer::Buffer`] and consumes
//! [`crossterm::event::KeyEvent`]s and bracketed pastes. Drawing to the terminal and running the
//! event loop are left to the embedding application, as is installing a `tracing` subscriber.

// Forbid accidental stdout/stderr writes in the library.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod bottom_pane;
mod config;
mod prompt_history_store;
mod render;
mod size_format;
mod style;
mod ui_consts;

pub use bottom_pane::Attachment;
pub use bottom_pane::AttachmentId;
pub use bottom_pane::AttachmentRegistry;
pub use bottom_pane::ChatComposer;
pub use bottom_pane::CursorPos;
pub use bottom_pane::HistorySource;
pub use bottom_pane::InputResult;
pub use bottom_pane::PlaceholderSpan;
pub use bottom_pane::position;
pub use config::ComposerConfig;
pub use prompt_history_store::PromptHistoryStore;
pub use promptpad_protocol::Submission;
pub use render::renderable::Renderable;
pub use style::ComposerTheme;
