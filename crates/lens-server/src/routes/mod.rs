//! Route handlers for the `/api` surface
//!
//! Every handler returns [`lens_api::ApiResult`] so the envelope layer
//! is the only place responses are built. The two exceptions are audio
//! serving and data export, which return raw bodies with their own
//! headers.

mod audio;
mod sessions;
mod speech;
mod transcripts;
mod user;

use axum::Router;
use axum::routing::{get, patch, post};
use lens_api::{ApiError, require_id};
use lens_core::{Session, VerifiedUser, collections::SESSIONS};
use lens_store::StoreError;

use crate::state::AppState;

/// All API routes, health excluded
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", post(sessions::create).get(sessions::list))
        .route(
            "/api/sessions/{id}",
            get(sessions::fetch).patch(sessions::update).delete(sessions::remove),
        )
        .route("/api/sessions/{id}/favorite", patch(sessions::toggle_favorite))
        .route("/api/sessions/{id}/upload", post(sessions::upload_audio))
        .route(
            "/api/sessions/{id}/analyze",
            post(sessions::analyze).get(sessions::fetch_analysis),
        )
        .route("/api/transcripts", post(transcripts::create).get(transcripts::list))
        .route("/api/audio/{id}", get(audio::serve))
        .route("/api/user/profile", get(user::profile).patch(user::update_profile))
        .route("/api/user/sync-profile", post(user::sync_profile))
        .route("/api/user/export", post(user::export))
        .route("/api/user/delete", post(user::delete_account))
        .route("/api/settings", get(user::settings).put(user::update_settings))
        .route("/api/tts", post(speech::synthesize))
        .route("/api/agent/signed-url", get(speech::signed_url))
}

/// Map a store failure onto the API taxonomy
///
/// Id collisions surface as conflicts; everything else is a database
/// error named after the operation that hit it.
pub(crate) fn store_error(error: StoreError, operation: &str) -> ApiError {
    match error {
        StoreError::AlreadyExists { .. } => ApiError::conflict("resource already exists").with_details(error.to_string()),
        other => ApiError::database(operation).with_details(other.to_string()),
    }
}

/// Fetch a session and enforce that `user` owns it
pub(crate) async fn load_owned_session(
    state: &AppState,
    user: &VerifiedUser,
    id: &str,
) -> Result<Session, ApiError> {
    require_id(id, "sessionId")?;

    let document = state
        .inner
        .store
        .get(SESSIONS, id)
        .await
        .map_err(|e| store_error(e, "session retrieval"))?
        .ok_or_else(|| ApiError::not_found_with_id("session", id))?;

    let session: Session = serde_json::from_value(document)
        .map_err(|e| ApiError::database("session retrieval").with_details(e.to_string()))?;

    if session.user_id != user.uid {
        return Err(ApiError::authorization_message("not authorized to access this session"));
    }

    Ok(session)
}
