//! Error types for the form bot.

use crate::i18n::MessageKey;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("No channel registered under {0}")]
    UnknownChannel(String),
}

/// Rejected answers. Never fatal: the step re-prompts and the session is
/// left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("answer is not a name")]
    InvalidName,

    #[error("age must be an integer from 4 to 120")]
    InvalidAge,

    #[error("gender must be picked from the offered options")]
    InvalidGenderChoice,

    #[error("a photo is required at this step")]
    MissingPhoto,

    #[error("education must be picked from the offered options")]
    InvalidEducationChoice,

    #[error("newsletter answer must be picked from the offered options")]
    InvalidNewsChoice,
}

impl ValidationError {
    /// Message key of the retry prompt for this rejection.
    pub fn retry_key(&self) -> MessageKey {
        match self {
            Self::InvalidName => MessageKey::NotName,
            Self::InvalidAge => MessageKey::NotAge,
            Self::InvalidGenderChoice => MessageKey::NotGender,
            Self::MissingPhoto => MessageKey::NotPhoto,
            Self::InvalidEducationChoice => MessageKey::NotEducation,
            Self::InvalidNewsChoice => MessageKey::NotNews,
        }
    }
}
