//! Answer validation: one acceptance rule per step.

use crate::error::ValidationError;

use super::event::FormEvent;
use super::model::{Education, Gender, PhotoRef, PhotoSize, StepValue, news_codes};
use super::state::FormStep;

pub const MIN_AGE: u8 = 4;
pub const MAX_AGE: u8 = 120;

/// Letters only, at least one.
pub fn validate_name(text: &str) -> Result<String, ValidationError> {
    if !text.is_empty() && text.chars().all(char::is_alphabetic) {
        Ok(text.to_string())
    } else {
        Err(ValidationError::InvalidName)
    }
}

/// ASCII digits only, value within `MIN_AGE..=MAX_AGE`.
pub fn validate_age(text: &str) -> Result<u8, ValidationError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidAge);
    }
    // Overlong digit strings fail to parse and are rejected like any other.
    let value: u32 = text.parse().map_err(|_| ValidationError::InvalidAge)?;
    u8::try_from(value)
        .ok()
        .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
        .ok_or(ValidationError::InvalidAge)
}

pub fn parse_gender(code: &str) -> Result<Gender, ValidationError> {
    Gender::from_code(code).ok_or(ValidationError::InvalidGenderChoice)
}

pub fn parse_education(code: &str) -> Result<Education, ValidationError> {
    Education::from_code(code).ok_or(ValidationError::InvalidEducationChoice)
}

pub fn parse_wish_news(code: &str) -> Result<bool, ValidationError> {
    match code {
        news_codes::YES => Ok(true),
        news_codes::NO => Ok(false),
        _ => Err(ValidationError::InvalidNewsChoice),
    }
}

pub fn pick_photo(sizes: &[PhotoSize]) -> Result<PhotoRef, ValidationError> {
    PhotoSize::largest(sizes)
        .map(PhotoRef::from)
        .ok_or(ValidationError::MissingPhoto)
}

/// The transition table: which event shape each step accepts, and the
/// value it yields.
///
/// Commands never reach this table; the engine resolves them first.
pub fn accept(step: FormStep, event: &FormEvent) -> Result<StepValue, ValidationError> {
    use FormStep::*;
    match (step, event) {
        (FillName, FormEvent::Text { text }) => validate_name(text).map(StepValue::Name),
        (FillName, _) => Err(ValidationError::InvalidName),

        (FillAge, FormEvent::Text { text }) => validate_age(text).map(StepValue::Age),
        (FillAge, _) => Err(ValidationError::InvalidAge),

        (FillGender, FormEvent::Choice { code }) => parse_gender(code).map(StepValue::Gender),
        (FillGender, _) => Err(ValidationError::InvalidGenderChoice),

        (UploadPhoto, FormEvent::Photo { sizes }) => pick_photo(sizes).map(StepValue::Photo),
        (UploadPhoto, _) => Err(ValidationError::MissingPhoto),

        (FillEducation, FormEvent::Choice { code }) => {
            parse_education(code).map(StepValue::Education)
        }
        (FillEducation, _) => Err(ValidationError::InvalidEducationChoice),

        (FillWishNews, FormEvent::Choice { code }) => {
            parse_wish_news(code).map(StepValue::WishNews)
        }
        (FillWishNews, _) => Err(ValidationError::InvalidNewsChoice),
    }
}
