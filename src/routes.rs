//! REST endpoints for completed profiles and form progress.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::error::DatabaseError;
use crate::form::FormStep;
use crate::store::{ProfileStore, SessionStore};

/// Shared state for profile routes.
#[derive(Clone)]
pub struct ProfileRouteState {
    pub sessions: Arc<dyn SessionStore>,
    pub profiles: Arc<dyn ProfileStore>,
}

/// Body of `GET /api/sessions/{user_id}`.
#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub active: bool,
    pub step: Option<FormStep>,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn storage_failure(e: DatabaseError) -> Response {
    tracing::error!(error = %e, "Profile route storage failure");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage unavailable")
}

/// GET /api/profiles/{user_id}
///
/// Returns the completed profile, or 404 if the user never finished the form.
async fn get_profile(
    State(state): State<ProfileRouteState>,
    Path(user_id): Path<String>,
) -> Response {
    match state.profiles.get_profile(&user_id).await {
        Ok(Some(profile)) => Json(profile).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "No profile exists for this user"),
        Err(e) => storage_failure(e),
    }
}

/// GET /api/sessions/{user_id}
async fn get_session(
    State(state): State<ProfileRouteState>,
    Path(user_id): Path<String>,
) -> Response {
    match state.sessions.get_session(&user_id).await {
        Ok(session) => Json(SessionStatus {
            active: session.is_some(),
            step: session.map(|s| s.step),
        })
        .into_response(),
        Err(e) => storage_failure(e),
    }
}

/// Build the profile REST routes.
pub fn profile_routes(state: ProfileRouteState) -> Router {
    Router::new()
        .route("/api/profiles/{user_id}", get(get_profile))
        .route("/api/sessions/{user_id}", get(get_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use chrono::Utc;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::form::{Education, FormSession, Gender, PhotoRef, Profile};
    use crate::store::MemoryStore;

    fn app(store: Arc<MemoryStore>) -> Router {
        profile_routes(ProfileRouteState {
            sessions: store.clone(),
            profiles: store,
        })
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_profile_is_404() {
        let (status, body) = get_json(app(Arc::new(MemoryStore::new())), "/api/profiles/42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn stored_profile_is_returned() {
        let store = Arc::new(MemoryStore::new());
        let profile = Profile {
            name: "Alice".into(),
            age: 29,
            gender: Gender::Male,
            photo: PhotoRef {
                unique_id: "u1".into(),
                file_id: "p1".into(),
            },
            education: Education::NoEducation,
            wish_news: true,
            completed_at: Utc::now(),
        };
        store.set_profile("42", &profile).await.unwrap();

        let (status, body) = get_json(app(store), "/api/profiles/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Alice");
        assert_eq!(body["age"], 29);
        assert_eq!(body["gender"], "male");
        assert_eq!(body["education"], "none");
        assert_eq!(body["photo"]["unique_id"], "u1");
        assert_eq!(body["wish_news"], true);
    }

    #[tokio::test]
    async fn session_status_reports_step() {
        let store = Arc::new(MemoryStore::new());
        let (_, idle) = get_json(app(store.clone()), "/api/sessions/42").await;
        assert_eq!(idle, serde_json::json!({"active": false, "step": null}));

        store.set_session("42", &FormSession::begin()).await.unwrap();
        let (status, active) = get_json(app(store), "/api/sessions/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(active, serde_json::json!({"active": true, "step": "fill_name"}));
    }
}
