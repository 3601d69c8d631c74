use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

/// A prompt sent by the user.
///
/// `text` is the literal composer content, placeholder tokens (e.g. `@paste-1`, `@notes.md`)
/// included. `attachments` maps each placeholder that was present in `text` and could be read to
/// the full content of its backing file.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Submission {
    pub text: String,
    #[serde(default)]
    pub attachments: BTreeMap<String, String>,
}

impl Submission {
    pub fn new(text: impl Into<String>, attachments: BTreeMap<String, String>) -> Self {
        Self {
            text: text.into(),
            attachments,
        }
    }

    /// Returns `text` with every attachment placeholder replaced by its content.
    ///
    /// Substitution is a single left-to-right pass, so attachment content is never rescanned.
    /// At any position the longest matching placeholder wins (`@paste-12` over `@paste-1`).
    pub fn expanded_text(&self) -> String {
        let mut placeholders: Vec<(&str, &str)> = self
            .attachments
            .iter()
            .map(|(placeholder, content)| (placeholder.as_str(), content.as_str()))
            .filter(|(placeholder, _)| !placeholder.is_empty())
            .collect();
        placeholders.sort_unstable_by_key(|(placeholder, _)| std::cmp::Reverse(placeholder.len()));

        let mut out = String::with_capacity(self.text.len());
        let mut rest = self.text.as_str();
        while let Some(ch) = rest.chars().next() {
            if let Some((placeholder, content)) = placeholders
                .iter()
                .find(|(placeholder, _)| rest.starts_with(placeholder))
            {
                out.push_str(content);
                rest = &rest[placeholder.len()..];
            } else {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
        out
    }
}
