//! Composer settings, read from the `[composer]` table of `~/.promptpad/config.toml`.
//!
//! ```toml
//! [composer]
//! max_inline_paste_lines = 10
//! max_inline_paste_chars = 1000
//! pastes_dir = "/tmp/promptpad/pastes"
//! history_path = "~/.promptpad/history.jsonl"
//! file_reference_root = "."
//! placeholder_text = "Ask anything"
//! ```

use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context as _;
use toml_edit::DocumentMut;
use toml_edit::Item as TomlItem;
use toml_edit::Table as TomlTable;

const CONFIG_DIR_NAME: &str = ".promptpad";
const DEFAULT_MAX_INLINE_PASTE_LINES: usize = 10;
const DEFAULT_MAX_INLINE_PASTE_CHARS: usize = 1000;
const DEFAULT_PLACEHOLDER_TEXT: &str = "Ask anything, paste, or @mention a file";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerConfig {
    /// Pastes with more lines than this are buffered into a file.
    pub max_inline_paste_lines: usize,
    /// Pastes with more characters than this are buffered into a file.
    pub max_inline_paste_chars: usize,
    /// Where buffered pastes are written. Created with mode 0700.
    pub pastes_dir: PathBuf,
    /// Prompt history log. `None` disables persistent history.
    pub history_path: Option<PathBuf>,
    /// Base directory for relative `@path` references.
    pub file_reference_root: PathBuf,
    /// Hint drawn while the buffer is empty.
    pub placeholder_text: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            max_inline_paste_lines: DEFAULT_MAX_INLINE_PASTE_LINES,
            max_inline_paste_chars: DEFAULT_MAX_INLINE_PASTE_CHARS,
            pastes_dir: default_pastes_dir(),
            history_path: dirs::home_dir().map(|home| default_history_path(&home)),
            file_reference_root: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            placeholder_text: DEFAULT_PLACEHOLDER_TEXT.to_string(),
        }
    }
}

impl ComposerConfig {
    /// Load `~/.promptpad/config.toml`, falling back to defaults when it does not exist.
    pub fn load_default() -> anyhow::Result<Self> {
        let Some(home) = dirs::home_dir() else {
            anyhow::bail!("cannot determine home directory for config path");
        };
        Self::load_from_path(&home.join(CONFIG_DIR_NAME).join("config.toml"))
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let Some(content) = read_document_string(path)? else {
            return Ok(Self::default());
        };
        let doc = content
            .parse::<DocumentMut>()
            .with_context(|| format!("parse {}", path.display()))?;
        Ok(Self::from_document(&doc))
    }

    fn from_document(doc: &DocumentMut) -> Self {
        let mut config = Self::default();
        let Some(table) = doc.get("composer").and_then(TomlItem::as_table) else {
            return config;
        };

        if let Some(lines) = read_usize(table, "max_inline_paste_lines") {
            config.max_inline_paste_lines = lines;
        }
        if let Some(chars) = read_usize(table, "max_inline_paste_chars") {
            config.max_inline_paste_chars = chars;
        }
        if let Some(dir) = read_path(table, "pastes_dir") {
            config.pastes_dir = dir;
        }
        if let Some(path) = read_path(table, "history_path") {
            config.history_path = Some(path);
        }
        if let Some(root) = read_path(table, "file_reference_root") {
            config.file_reference_root = root;
        }
        if let Some(text) = read_str(table, "placeholder_text") {
            config.placeholder_text = text.to_string();
        }
        config
    }
}

fn default_pastes_dir() -> PathBuf {
    std::env::temp_dir().join("promptpad").join("pastes")
}

fn default_history_path(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR_NAME).join("history.jsonl")
}

fn read_str<'a>(table: &'a TomlTable, key: &str) -> Option<&'a str> {
    table
        .get(key)
        .and_then(TomlItem::as_value)
        .and_then(|v| v.as_str())
}

fn read_usize(table: &TomlTable, key: &str) -> Option<usize> {
    table
        .get(key)
        .and_then(TomlItem::as_value)
        .and_then(|v| v.as_integer())
        .and_then(|v| usize::try_from(v).ok())
}

fn read_path(table: &TomlTable, key: &str) -> Option<PathBuf> {
    let raw = read_str(table, key)?;
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return Some(home.join(rest));
    }
    Some(PathBuf::from(raw))
}

fn read_document_string(path: &Path) -> anyhow::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(anyhow::Error::new(err).context("read config.toml")),
    }
}
