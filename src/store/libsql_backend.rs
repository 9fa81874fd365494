//! libSQL backend: durable session and profile storage.
//!
//! Supports local file and in-memory databases. Sessions survive restarts,
//! so a user can pick the questionnaire up where they left it.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::form::{Education, FormSession, FormStep, Gender, PhotoRef, Profile, ProfileDraft};
use crate::store::migrations;
use crate::store::traits::{ProfileStore, SessionStore};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;
        Self::from_database(db).await
    }

    async fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn str_to_gender(s: &str) -> Result<Gender, DatabaseError> {
    match s {
        "male" => Ok(Gender::Male),
        "female" => Ok(Gender::Female),
        "unspecified" => Ok(Gender::Unspecified),
        other => Err(DatabaseError::Serialization(format!(
            "unknown gender '{other}'"
        ))),
    }
}

fn str_to_education(s: &str) -> Result<Education, DatabaseError> {
    match s {
        "secondary" => Ok(Education::Secondary),
        "higher" => Ok(Education::Higher),
        "none" => Ok(Education::NoEducation),
        other => Err(DatabaseError::Serialization(format!(
            "unknown education '{other}'"
        ))),
    }
}

fn text(row: &libsql::Row, idx: i32, what: &str) -> Result<String, DatabaseError> {
    row.get::<String>(idx)
        .map_err(|e| DatabaseError::Query(format!("read {what}: {e}")))
}

fn integer(row: &libsql::Row, idx: i32, what: &str) -> Result<i64, DatabaseError> {
    row.get::<i64>(idx)
        .map_err(|e| DatabaseError::Query(format!("read {what}: {e}")))
}

/// Map a libsql Row to a FormSession.
///
/// Column order: 0:step, 1:draft, 2:started_at, 3:updated_at
fn row_to_session(row: &libsql::Row) -> Result<FormSession, DatabaseError> {
    let step = text(row, 0, "step")?;
    let draft = text(row, 1, "draft")?;
    let started_at = text(row, 2, "started_at")?;
    let updated_at = text(row, 3, "updated_at")?;

    let step: FormStep = step.parse().map_err(DatabaseError::Serialization)?;
    let draft: ProfileDraft =
        serde_json::from_str(&draft).map_err(|e| DatabaseError::Serialization(e.to_string()))?;

    Ok(FormSession {
        step,
        draft,
        started_at: parse_datetime(&started_at),
        updated_at: parse_datetime(&updated_at),
    })
}

/// Map a libsql Row to a Profile.
///
/// Column order matches PROFILE_COLUMNS.
fn row_to_profile(row: &libsql::Row) -> Result<Profile, DatabaseError> {
    let age = integer(row, 1, "age")?;
    let gender = text(row, 2, "gender")?;
    let education = text(row, 5, "education")?;
    let wish_news = integer(row, 6, "wish_news")?;
    let completed_at = text(row, 7, "completed_at")?;

    Ok(Profile {
        name: text(row, 0, "name")?,
        age: u8::try_from(age)
            .map_err(|_| DatabaseError::Serialization(format!("age out of range: {age}")))?,
        gender: str_to_gender(&gender)?,
        photo: PhotoRef {
            unique_id: text(row, 3, "photo_unique_id")?,
            file_id: text(row, 4, "photo_file_id")?,
        },
        education: str_to_education(&education)?,
        wish_news: wish_news != 0,
        completed_at: parse_datetime(&completed_at),
    })
}

// ── Trait implementations ───────────────────────────────────────────

const PROFILE_COLUMNS: &str =
    "name, age, gender, photo_unique_id, photo_file_id, education, wish_news, completed_at";

#[async_trait]
impl SessionStore for LibSqlBackend {
    async fn get_session(&self, user_id: &str) -> Result<Option<FormSession>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT step, draft, started_at, updated_at FROM form_sessions WHERE user_id = ?1",
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_session: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row_to_session(&row).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_session: {e}"))),
        }
    }

    async fn set_session(
        &self,
        user_id: &str,
        session: &FormSession,
    ) -> Result<(), DatabaseError> {
        let draft = serde_json::to_string(&session.draft)
            .map_err(|e| DatabaseError::Serialization(e.to_string()))?;

        self.conn()
            .execute(
                "INSERT INTO form_sessions (user_id, step, draft, started_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT (user_id) DO UPDATE SET
                    step = ?2, draft = ?3, started_at = ?4, updated_at = ?5",
                params![
                    user_id,
                    session.step.to_string(),
                    draft,
                    session.started_at.to_rfc3339(),
                    session.updated_at.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("set_session: {e}")))?;

        debug!(user_id, step = %session.step, "Session saved");
        Ok(())
    }

    async fn clear_session(&self, user_id: &str) -> Result<bool, DatabaseError> {
        let count = self
            .conn()
            .execute(
                "DELETE FROM form_sessions WHERE user_id = ?1",
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("clear_session: {e}")))?;
        Ok(count > 0)
    }
}

#[async_trait]
impl ProfileStore for LibSqlBackend {
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1"),
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_profile: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => row_to_profile(&row).map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_profile: {e}"))),
        }
    }

    async fn set_profile(&self, user_id: &str, profile: &Profile) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                &format!(
                    "INSERT INTO profiles (user_id, {PROFILE_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                     ON CONFLICT (user_id) DO UPDATE SET
                        name = ?2, age = ?3, gender = ?4, photo_unique_id = ?5,
                        photo_file_id = ?6, education = ?7, wish_news = ?8, completed_at = ?9"
                ),
                params![
                    user_id,
                    profile.name.as_str(),
                    i64::from(profile.age),
                    profile.gender.to_string(),
                    profile.photo.unique_id.as_str(),
                    profile.photo.file_id.as_str(),
                    profile.education.to_string(),
                    i64::from(profile.wish_news),
                    profile.completed_at.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("set_profile: {e}")))?;

        info!(user_id, "Profile saved");
        Ok(())
    }
}
