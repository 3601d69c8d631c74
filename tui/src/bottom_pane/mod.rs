//! The prompt input: an editable buffer with embedded attachments and history suggestions.
//!
//! [`ChatComposer`] is the entry point. The other modules are its parts, leaves first:
//! `position` (cursor coordinates), `textarea` (the widget), `attachments` (live registry),
//! `paste` and `file_reference` (where attachments come from), and `suggestion` (ghost text).

mod attachments;
mod chat_composer;
mod file_reference;
mod paste;
pub mod position;
mod suggestion;
mod textarea;

pub use attachments::Attachment;
pub use attachments::AttachmentId;
pub use attachments::AttachmentRegistry;
pub use attachments::PlaceholderSpan;
pub use chat_composer::ChatComposer;
pub use chat_composer::InputResult;
pub use position::CursorPos;
pub use suggestion::HistorySource;
