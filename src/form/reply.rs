//! Outbound replies and the option keyboards the flow offers.

use serde::Serialize;

use crate::i18n::{Localizer, MessageKey};

use super::model::{Education, Gender, news_codes};

/// One pressable option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceButton {
    pub label: String,
    pub code: String,
}

impl ChoiceButton {
    pub fn new(label: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            code: code.into(),
        }
    }
}

/// Something to show the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    /// Text with optional option rows.
    Text {
        text: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        choices: Vec<Vec<ChoiceButton>>,
    },
    /// A previously uploaded photo, re-sent by file id.
    Photo { file_id: String, caption: String },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            choices: Vec::new(),
        }
    }

    pub fn with_choices(text: impl Into<String>, choices: Vec<Vec<ChoiceButton>>) -> Self {
        Self::Text {
            text: text.into(),
            choices,
        }
    }

    /// The text, or the caption for photos.
    pub fn content(&self) -> &str {
        match self {
            Self::Text { text, .. } => text,
            Self::Photo { caption, .. } => caption,
        }
    }

    pub fn choices(&self) -> &[Vec<ChoiceButton>] {
        match self {
            Self::Text { choices, .. } => choices,
            Self::Photo { .. } => &[],
        }
    }
}

/// Two on the first row, "not sure" below.
pub fn gender_choices(l: &Localizer<'_>) -> Vec<Vec<ChoiceButton>> {
    let button = |g: Gender| ChoiceButton::new(l.get(g.label_key()), g.code());
    vec![
        vec![button(Gender::Male), button(Gender::Female)],
        vec![button(Gender::Unspecified)],
    ]
}

pub fn education_choices(l: &Localizer<'_>) -> Vec<Vec<ChoiceButton>> {
    let button = |e: Education| ChoiceButton::new(l.get(e.label_key()), e.code());
    vec![
        vec![button(Education::Secondary), button(Education::Higher)],
        vec![button(Education::NoEducation)],
    ]
}

pub fn wish_news_choices(l: &Localizer<'_>) -> Vec<Vec<ChoiceButton>> {
    vec![vec![
        ChoiceButton::new(l.get(MessageKey::Yes), news_codes::YES),
        ChoiceButton::new(l.get(MessageKey::No), news_codes::NO),
    ]]
}
