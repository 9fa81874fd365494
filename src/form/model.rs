//! Profile data model: the completed record and the partial draft behind it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::i18n::{Localizer, MessageKey};

/// Gender as picked from the offered options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Unspecified,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Self::Male, Self::Female, Self::Unspecified];

    /// Option code carried by the button for this choice.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Male => "male_gender",
            Self::Female => "female_gender",
            Self::Unspecified => "undefined_gender",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.code() == code)
    }

    pub fn label_key(&self) -> MessageKey {
        match self {
            Self::Male => MessageKey::MaleGender,
            Self::Female => MessageKey::FemaleGender,
            Self::Unspecified => MessageKey::UnknownGender,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
            Self::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// Highest completed education level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Education {
    Secondary,
    Higher,
    #[serde(rename = "none")]
    NoEducation,
}

impl Education {
    pub const ALL: [Education; 3] = [Self::Secondary, Self::Higher, Self::NoEducation];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Secondary => "secondary",
            Self::Higher => "higher",
            Self::NoEducation => "no_edu",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.code() == code)
    }

    pub fn label_key(&self) -> MessageKey {
        match self {
            Self::Secondary => MessageKey::SecondaryButton,
            Self::Higher => MessageKey::HigherButton,
            Self::NoEducation => MessageKey::NoEducationButton,
        }
    }
}

impl std::fmt::Display for Education {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Secondary => write!(f, "secondary"),
            Self::Higher => write!(f, "higher"),
            Self::NoEducation => write!(f, "none"),
        }
    }
}

/// Option codes for the newsletter question.
pub mod news_codes {
    pub const YES: &str = "yes_news";
    pub const NO: &str = "no_news";
}

/// One resolution variant of an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSize {
    /// Identifier used to fetch or re-send the file.
    pub file_id: String,
    /// Identifier stable across bots and time; cannot be used to fetch.
    pub file_unique_id: String,
    pub width: u32,
    pub height: u32,
}

impl PhotoSize {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Highest-resolution variant. On equal area the later variant wins,
    /// matching the transport's smallest-first ordering.
    pub fn largest(sizes: &[PhotoSize]) -> Option<&PhotoSize> {
        sizes.iter().max_by_key(|s| s.area())
    }
}

/// Reference to a stored photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRef {
    pub unique_id: String,
    pub file_id: String,
}

impl From<&PhotoSize> for PhotoRef {
    fn from(size: &PhotoSize) -> Self {
        Self {
            unique_id: size.file_unique_id.clone(),
            file_id: size.file_id.clone(),
        }
    }
}

/// A completed, validated questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub photo: PhotoRef,
    pub education: Education,
    pub wish_news: bool,
    pub completed_at: DateTime<Utc>,
}

impl Profile {
    /// Localized multi-line summary, used as the photo caption.
    pub fn summary(&self, l: &Localizer<'_>) -> String {
        [
            format!("{}: {}", l.get(MessageKey::SummaryName), self.name),
            format!("{}: {}", l.get(MessageKey::SummaryAge), self.age),
            format!(
                "{}: {}",
                l.get(MessageKey::SummaryGender),
                l.get(self.gender.label_key())
            ),
            format!(
                "{}: {}",
                l.get(MessageKey::SummaryEducation),
                l.get(self.education.label_key())
            ),
            format!(
                "{}: {}",
                l.get(MessageKey::SummaryWishNews),
                l.yes_no(self.wish_news)
            ),
        ]
        .join("\n")
    }
}

/// A validated answer for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepValue {
    Name(String),
    Age(u8),
    Gender(Gender),
    Photo(PhotoRef),
    Education(Education),
    WishNews(bool),
}

/// Answers collected so far. Only ever turned into a [`Profile`] once every
/// field is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<PhotoRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<Education>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wish_news: Option<bool>,
}

impl ProfileDraft {
    pub fn apply(&mut self, value: StepValue) {
        match value {
            StepValue::Name(name) => self.name = Some(name),
            StepValue::Age(age) => self.age = Some(age),
            StepValue::Gender(gender) => self.gender = Some(gender),
            StepValue::Photo(photo) => self.photo = Some(photo),
            StepValue::Education(education) => self.education = Some(education),
            StepValue::WishNews(wish) => self.wish_news = Some(wish),
        }
    }

    /// Build the final profile, or `None` if any field is still missing.
    pub fn complete(self, completed_at: DateTime<Utc>) -> Option<Profile> {
        Some(Profile {
            name: self.name?,
            age: self.age?,
            gender: self.gender?,
            photo: self.photo?,
            education: self.education?,
            wish_news: self.wish_news?,
            completed_at,
        })
    }
}
