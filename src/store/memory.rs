//! In-memory store: for tests and for running without a database file.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::DatabaseError;
use crate::form::{FormSession, Profile};

use super::traits::{ProfileStore, SessionStore};

/// Sessions and profiles held in process memory. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, FormSession>>,
    profiles: RwLock<HashMap<String, Profile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of in-progress sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get_session(&self, user_id: &str) -> Result<Option<FormSession>, DatabaseError> {
        Ok(self.sessions.read().await.get(user_id).cloned())
    }

    async fn set_session(
        &self,
        user_id: &str,
        session: &FormSession,
    ) -> Result<(), DatabaseError> {
        self.sessions
            .write()
            .await
            .insert(user_id.to_string(), session.clone());
        Ok(())
    }

    async fn clear_session(&self, user_id: &str) -> Result<bool, DatabaseError> {
        Ok(self.sessions.write().await.remove(user_id).is_some())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, DatabaseError> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn set_profile(&self, user_id: &str, profile: &Profile) -> Result<(), DatabaseError> {
        self.profiles
            .write()
            .await
            .insert(user_id.to_string(), profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::form::{Education, FormStep, Gender, PhotoRef};

    fn profile(name: &str) -> Profile {
        Profile {
            name: name.to_string(),
            age: 30,
            gender: Gender::Unspecified,
            photo: PhotoRef {
                unique_id: "u".to_string(),
                file_id: "f".to_string(),
            },
            education: Education::Secondary,
            wish_news: true,
            completed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn session_set_get_clear() {
        let store = MemoryStore::new();
        assert!(store.get_session("1").await.unwrap().is_none());

        let mut session = FormSession::begin();
        session.advance();
        store.set_session("1", &session).await.unwrap();
        assert_eq!(
            store.get_session("1").await.unwrap().unwrap().step,
            FormStep::FillAge
        );
        assert_eq!(store.session_count().await, 1);

        assert!(store.clear_session("1").await.unwrap());
        assert!(!store.clear_session("1").await.unwrap());
        assert!(store.get_session("1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_overwrite() {
        let store = MemoryStore::new();
        assert!(store.get_profile("1").await.unwrap().is_none());

        store.set_profile("1", &profile("Alice")).await.unwrap();
        store.set_profile("1", &profile("Bob")).await.unwrap();
        assert_eq!(store.get_profile("1").await.unwrap().unwrap().name, "Bob");
        assert!(store.get_profile("2").await.unwrap().is_none());
    }
}
