//! Storage traits the form engine depends on.
//!
//! The engine only needs get/set/clear by user id; any key-value store can
//! back these.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::form::{FormSession, Profile};

/// In-progress questionnaires, keyed by user id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the session, or `None` when no form is in progress.
    async fn get_session(&self, user_id: &str) -> Result<Option<FormSession>, DatabaseError>;

    /// Insert or replace the session.
    async fn set_session(&self, user_id: &str, session: &FormSession)
    -> Result<(), DatabaseError>;

    /// Remove the session. Returns whether one existed.
    async fn clear_session(&self, user_id: &str) -> Result<bool, DatabaseError>;
}

/// Completed profiles, keyed by user id.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load the profile, or `None` if the user never completed the form.
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, DatabaseError>;

    /// Insert or overwrite the profile.
    async fn set_profile(&self, user_id: &str, profile: &Profile) -> Result<(), DatabaseError>;
}
