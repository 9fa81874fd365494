//! Localization: message-key catalogs with a default-language fallback.
//!
//! Every prompt, retry, confirmation and button label the form flow emits is
//! addressed by a [`MessageKey`]. A [`Translations`] set maps language codes
//! to catalogs; lookups for an unknown language resolve to the default one.

mod en;
mod ru;

use std::collections::HashMap;

use crate::error::ConfigError;

/// Every string the bot can show to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Start,
    CancelIdle,
    CancelActive,
    FillForm,
    ThankName,
    NotName,
    MaleGender,
    FemaleGender,
    UnknownGender,
    ThankAge,
    NotAge,
    ThankGender,
    NotGender,
    SecondaryButton,
    HigherButton,
    NoEducationButton,
    ThankPhoto,
    NotPhoto,
    Yes,
    No,
    ThankEducation,
    NotEducation,
    ThankNews,
    NotNews,
    ShowDataHint,
    NoProfile,
    NotUnderstood,
    InternalError,
    SummaryName,
    SummaryAge,
    SummaryGender,
    SummaryEducation,
    SummaryWishNews,
    CommandStart,
    CommandCancel,
    CommandFillForm,
    CommandShowData,
}

impl MessageKey {
    pub const ALL: [MessageKey; 37] = [
        Self::Start,
        Self::CancelIdle,
        Self::CancelActive,
        Self::FillForm,
        Self::ThankName,
        Self::NotName,
        Self::MaleGender,
        Self::FemaleGender,
        Self::UnknownGender,
        Self::ThankAge,
        Self::NotAge,
        Self::ThankGender,
        Self::NotGender,
        Self::SecondaryButton,
        Self::HigherButton,
        Self::NoEducationButton,
        Self::ThankPhoto,
        Self::NotPhoto,
        Self::Yes,
        Self::No,
        Self::ThankEducation,
        Self::NotEducation,
        Self::ThankNews,
        Self::NotNews,
        Self::ShowDataHint,
        Self::NoProfile,
        Self::NotUnderstood,
        Self::InternalError,
        Self::SummaryName,
        Self::SummaryAge,
        Self::SummaryGender,
        Self::SummaryEducation,
        Self::SummaryWishNews,
        Self::CommandStart,
        Self::CommandCancel,
        Self::CommandFillForm,
        Self::CommandShowData,
    ];

    /// Stable snake_case name, used in logs and as the last-resort text.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::CancelIdle => "cancel_idle",
            Self::CancelActive => "cancel_active",
            Self::FillForm => "fill_form",
            Self::ThankName => "thank_name",
            Self::NotName => "not_name",
            Self::MaleGender => "male_gender",
            Self::FemaleGender => "female_gender",
            Self::UnknownGender => "unknown_gender",
            Self::ThankAge => "thank_age",
            Self::NotAge => "not_age",
            Self::ThankGender => "thank_gender",
            Self::NotGender => "not_gender",
            Self::SecondaryButton => "secondary_button",
            Self::HigherButton => "higher_button",
            Self::NoEducationButton => "no_edu_button",
            Self::ThankPhoto => "thank_photo",
            Self::NotPhoto => "not_photo",
            Self::Yes => "yes",
            Self::No => "no",
            Self::ThankEducation => "thank_edu",
            Self::NotEducation => "not_edu",
            Self::ThankNews => "thank_news",
            Self::NotNews => "not_news",
            Self::ShowDataHint => "show_data_hint",
            Self::NoProfile => "no_profile",
            Self::NotUnderstood => "not_understood",
            Self::InternalError => "internal_error",
            Self::SummaryName => "summary_name",
            Self::SummaryAge => "summary_age",
            Self::SummaryGender => "summary_gender",
            Self::SummaryEducation => "summary_education",
            Self::SummaryWishNews => "summary_wish_news",
            Self::CommandStart => "command_start",
            Self::CommandCancel => "command_cancel",
            Self::CommandFillForm => "command_fillform",
            Self::CommandShowData => "command_showdata",
        }
    }
}

impl std::fmt::Display for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One language's key → text table.
#[derive(Debug, Clone)]
pub struct Catalog {
    language: String,
    entries: HashMap<MessageKey, &'static str>,
}

impl Catalog {
    pub fn new(language: &str, entries: &[(MessageKey, &'static str)]) -> Self {
        Self {
            language: language.to_string(),
            entries: entries.iter().copied().collect(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn lookup(&self, key: MessageKey) -> Option<&'static str> {
        self.entries.get(&key).copied()
    }
}

/// The set of catalogs the bot knows, plus the default language.
#[derive(Debug, Clone)]
pub struct Translations {
    default_language: String,
    catalogs: HashMap<String, Catalog>,
}

impl Translations {
    /// Built-in English and Russian catalogs, English by default.
    pub fn builtin() -> Self {
        let mut catalogs = HashMap::new();
        for catalog in [Catalog::new("en", en::ENTRIES), Catalog::new("ru", ru::ENTRIES)] {
            catalogs.insert(catalog.language().to_string(), catalog);
        }
        Self {
            default_language: "en".to_string(),
            catalogs,
        }
    }

    /// Switch the default language. Fails when no catalog exists for it.
    pub fn with_default_language(mut self, language: &str) -> Result<Self, ConfigError> {
        let code = normalize(language);
        if !self.catalogs.contains_key(&code) {
            return Err(ConfigError::InvalidValue {
                key: "FORM_BOT_DEFAULT_LANG".to_string(),
                message: format!("no catalog for language '{language}'"),
            });
        }
        self.default_language = code;
        Ok(self)
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Known language codes, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut langs: Vec<&str> = self.catalogs.keys().map(String::as_str).collect();
        langs.sort_unstable();
        langs
    }

    /// Resolve the catalog for a user's language preference.
    ///
    /// `en-US` and `en_US` resolve like `en`. Missing or unknown preferences
    /// resolve to the default language.
    pub fn localize(&self, preference: Option<&str>) -> Localizer<'_> {
        let fallback = &self.catalogs[&self.default_language];
        let catalog = preference
            .map(normalize)
            .and_then(|code| self.catalogs.get(&code))
            .unwrap_or(fallback);
        Localizer { catalog, fallback }
    }
}

impl Default for Translations {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A resolved catalog with the default one behind it.
#[derive(Debug, Clone, Copy)]
pub struct Localizer<'a> {
    catalog: &'a Catalog,
    fallback: &'a Catalog,
}

impl Localizer<'_> {
    pub fn language(&self) -> &str {
        self.catalog.language()
    }

    pub fn get(&self, key: MessageKey) -> &'static str {
        self.catalog
            .lookup(key)
            .or_else(|| self.fallback.lookup(key))
            .unwrap_or_else(|| key.name())
    }

    /// Localized yes/no.
    pub fn yes_no(&self, value: bool) -> &'static str {
        self.get(if value { MessageKey::Yes } else { MessageKey::No })
    }
}

fn normalize(code: &str) -> String {
    code.split(['-', '_'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
