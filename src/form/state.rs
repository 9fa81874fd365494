//! Form state machine: tracks which question the user is answering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::i18n::MessageKey;

use super::model::ProfileDraft;

/// The questions of the form, in order.
///
/// Progresses linearly: FillName → FillAge → FillGender → UploadPhoto →
/// FillEducation → FillWishNews. Having no session at all is the idle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
    FillName,
    FillAge,
    FillGender,
    UploadPhoto,
    FillEducation,
    FillWishNews,
}

impl FormStep {
    pub const FIRST: FormStep = FormStep::FillName;

    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: FormStep) -> bool {
        use FormStep::*;
        matches!(
            (self, target),
            (FillName, FillAge)
                | (FillAge, FillGender)
                | (FillGender, UploadPhoto)
                | (UploadPhoto, FillEducation)
                | (FillEducation, FillWishNews)
        )
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<FormStep> {
        use FormStep::*;
        match self {
            FillName => Some(FillAge),
            FillAge => Some(FillGender),
            FillGender => Some(UploadPhoto),
            UploadPhoto => Some(FillEducation),
            FillEducation => Some(FillWishNews),
            FillWishNews => None,
        }
    }

    /// Prompt re-sent when the answer for this step is rejected.
    pub fn retry_key(&self) -> MessageKey {
        match self {
            Self::FillName => MessageKey::NotName,
            Self::FillAge => MessageKey::NotAge,
            Self::FillGender => MessageKey::NotGender,
            Self::UploadPhoto => MessageKey::NotPhoto,
            Self::FillEducation => MessageKey::NotEducation,
            Self::FillWishNews => MessageKey::NotNews,
        }
    }
}

impl std::fmt::Display for FormStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::FillName => "fill_name",
            Self::FillAge => "fill_age",
            Self::FillGender => "fill_gender",
            Self::UploadPhoto => "upload_photo",
            Self::FillEducation => "fill_education",
            Self::FillWishNews => "fill_wish_news",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for FormStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fill_name" => Ok(Self::FillName),
            "fill_age" => Ok(Self::FillAge),
            "fill_gender" => Ok(Self::FillGender),
            "upload_photo" => Ok(Self::UploadPhoto),
            "fill_education" => Ok(Self::FillEducation),
            "fill_wish_news" => Ok(Self::FillWishNews),
            other => Err(format!("unknown form step '{other}'")),
        }
    }
}

/// A user's in-progress questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSession {
    pub step: FormStep,
    pub draft: ProfileDraft,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormSession {
    /// A fresh session waiting for the first answer.
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            step: FormStep::FIRST,
            draft: ProfileDraft::default(),
            started_at: now,
            updated_at: now,
        }
    }

    /// Move to the next step. Returns `None` (and stays put) on the last step.
    pub fn advance(&mut self) -> Option<FormStep> {
        let next = self.step.next()?;
        debug_assert!(self.step.can_transition_to(next));
        self.step = next;
        self.updated_at = Utc::now();
        Some(next)
    }
}
