//! Prompt text shown to the user
//!
//! Keys are addressed by a composite path such as `docker.io/library/<hex-id>`.
//! The part before the last `/` is the repository alias, shown for context
//! next to the first few characters of the key id.

use std::fmt;

/// Number of key id characters shown in prompts.
pub const KEY_ID_DISPLAY_LEN: usize = 7;

/// A composite key path split into its display parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyName<'a> {
    pub alias: Option<&'a str>,
    pub key_id: &'a str,
}

impl<'a> KeyName<'a> {
    /// Splits `path` at its last `/`; an empty or missing alias becomes `None`.
    pub fn parse(path: &'a str) -> Self {
        match path.rsplit_once('/') {
            Some((alias, key_id)) if !alias.is_empty() => KeyName {
                alias: Some(alias),
                key_id,
            },
            Some((_, key_id)) => KeyName {
                alias: None,
                key_id,
            },
            None => KeyName {
                alias: None,
                key_id: path,
            },
        }
    }

    /// The key id as shown in prompts.
    pub fn short_id(&self) -> &'a str {
        short_id(self.key_id)
    }
}

impl fmt::Display for KeyName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.alias {
            Some(alias) => write!(f, "{} ({})", self.short_id(), alias),
            None => f.write_str(self.short_id()),
        }
    }
}

/// First [`KEY_ID_DISPLAY_LEN`] characters of `key_id`, or all of it when shorter.
pub fn short_id(key_id: &str) -> &str {
    match key_id.char_indices().nth(KEY_ID_DISPLAY_LEN) {
        Some((end, _)) => &key_id[..end],
        None => key_id,
    }
}

/// Which of the three prompt wordings to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Unlocking a key that already exists.
    Existing,
    /// First entry of the passphrase for a key being created.
    New,
    /// Confirmation entry for a key being created.
    Repeat,
}

/// Renders the prompt text for `key` acting in `role`.
pub fn format_prompt(key: &KeyName<'_>, role: &str, kind: PromptKind) -> String {
    match kind {
        PromptKind::Existing => format!("Enter passphrase for {role} key with ID {key}: "),
        PromptKind::New => format!("Enter passphrase for new {role} key with ID {key}: "),
        PromptKind::Repeat => format!("Repeat passphrase for new {role} key with ID {key}:"),
    }
}
