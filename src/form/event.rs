//! Inbound events the form flow reacts to.

use serde::{Deserialize, Serialize};

use crate::i18n::MessageKey;

use super::model::PhotoSize;

/// Bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Greeting and usage hint.
    Start,
    /// Begin filling out the form.
    FillForm,
    /// Abandon the form in progress.
    Cancel,
    /// Show the completed profile.
    ShowData,
}

impl Command {
    /// Menu order.
    pub const ALL: [Command; 4] = [Self::Start, Self::Cancel, Self::FillForm, Self::ShowData];

    /// Command name without the leading slash.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::FillForm => "fillform",
            Self::Cancel => "cancel",
            Self::ShowData => "showdata",
        }
    }

    pub fn description_key(&self) -> MessageKey {
        match self {
            Self::Start => MessageKey::CommandStart,
            Self::FillForm => MessageKey::CommandFillForm,
            Self::Cancel => MessageKey::CommandCancel,
            Self::ShowData => MessageKey::CommandShowData,
        }
    }

    /// Parse `/name`, `/name@some_bot` or `/name args`. Unknown commands
    /// return `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.trim().split_whitespace().next()?;
        let name = token.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.name())
    }
}

/// A user action, already classified by shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormEvent {
    Command { command: Command },
    Text { text: String },
    /// A pressed option, carrying its code.
    Choice { code: String },
    /// An uploaded image in all the sizes the transport offers.
    Photo { sizes: Vec<PhotoSize> },
    /// Anything else (stickers, documents, voice, …).
    Unsupported,
}

impl FormEvent {
    /// Classify a text message: recognized commands become `Command`,
    /// everything else (including unknown `/commands`) stays `Text`.
    pub fn from_text(text: &str) -> Self {
        match Command::parse(text) {
            Some(command) => Self::Command { command },
            None => Self::Text {
                text: text.to_string(),
            },
        }
    }

    pub fn choice(code: impl Into<String>) -> Self {
        Self::Choice { code: code.into() }
    }

    /// Short kind label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Command { .. } => "command",
            Self::Text { .. } => "text",
            Self::Choice { .. } => "choice",
            Self::Photo { .. } => "photo",
            Self::Unsupported => "unsupported",
        }
    }
}
