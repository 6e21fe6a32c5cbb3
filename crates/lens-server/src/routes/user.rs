//! Profile, settings, export and account deletion routes
//!
//! Profile documents are keyed `user_<uid>` and carry a `settings`
//! subdocument. Sync-profile upserts from the verified token claims so
//! the backend never trusts client-supplied identity fields.

use std::sync::Arc;

use axum::Extension;
use axum::extract::State;
use axum::response::Response;
use http::{StatusCode, header};
use jiff::Timestamp;
use lens_api::{ApiError, ApiResult, ApiSuccess, Validate, ValidatedJson, Violations};
use lens_core::{VerifiedUser, collections::{AUDIO_FILES, SESSIONS, TRANSCRIPTS, USERS}};
use lens_store::{Filter, StoreError};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::state::AppState;

use super::store_error;

/// `GET /api/user/profile`
pub async fn profile(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
) -> ApiResult<Value> {
    let document = state
        .inner
        .store
        .get(USERS, &user.profile_id())
        .await
        .map_err(|e| store_error(e, "profile retrieval"))?
        .ok_or_else(|| ApiError::not_found("profile"))?;

    Ok(ApiSuccess::new(document))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default, rename = "photoURL")]
    photo_url: Option<String>,
}

impl Validate for UpdateProfileRequest {
    fn validate(&self) -> Result<(), Violations> {
        let mut violations = Violations::new();
        if self.display_name.is_none() && self.photo_url.is_none() {
            violations.push("body", "at least one field must be provided");
        }
        if let Some(ref name) = self.display_name
            && name.trim().is_empty()
        {
            violations.push("displayName", "must be a non-empty string");
        }
        if let Some(ref photo_url) = self.photo_url
            && url::Url::parse(photo_url).is_err()
        {
            violations.push("photoURL", "must be a valid URL");
        }
        violations.into_result()
    }
}

/// `PATCH /api/user/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    ValidatedJson(body): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<Value> {
    let mut patch = serde_json::Map::new();
    if let Some(display_name) = body.display_name {
        patch.insert("displayName".to_owned(), json!(display_name));
    }
    if let Some(photo_url) = body.photo_url {
        patch.insert("photoURL".to_owned(), json!(photo_url));
    }

    let updated = state
        .inner
        .store
        .update(USERS, &user.profile_id(), Value::Object(patch))
        .await
        .map_err(|e| match e {
            StoreError::NotFound { .. } => ApiError::not_found("profile"),
            other => store_error(other, "profile update"),
        })?;

    Ok(ApiSuccess::new(updated).with_message("profile updated"))
}

/// `POST /api/user/sync-profile`
///
/// Upserts the profile from the verified token claims. First login
/// creates the document; later calls refresh the identity fields and
/// leave settings untouched.
pub async fn sync_profile(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
) -> ApiResult<Value> {
    let profile_id = user.profile_id();
    let claims = json!({
        "uid": user.uid,
        "email": user.email,
        "displayName": user.display_name,
        "photoURL": user.photo_url,
        "emailVerified": user.email_verified,
        "role": user.role,
        "plan": user.plan,
        "lastLoginAt": Timestamp::now().to_string(),
    });

    let existing = state
        .inner
        .store
        .get(USERS, &profile_id)
        .await
        .map_err(|e| store_error(e, "profile retrieval"))?;

    if existing.is_some() {
        let updated = state
            .inner
            .store
            .update(USERS, &profile_id, claims)
            .await
            .map_err(|e| store_error(e, "profile update"))?;
        return Ok(ApiSuccess::new(updated).with_message("profile synced"));
    }

    let mut document = claims;
    if let Some(fields) = document.as_object_mut() {
        fields.insert("settings".to_owned(), json!({}));
    }
    let created = state
        .inner
        .store
        .create(USERS, &profile_id, document)
        .await
        .map_err(|e| store_error(e, "profile creation"))?;

    tracing::info!(user_id = %user.uid, "profile created");
    Ok(ApiSuccess::created(created).with_message("profile created"))
}

/// `GET /api/settings`
pub async fn settings(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
) -> ApiResult<Value> {
    let document = state
        .inner
        .store
        .get(USERS, &user.profile_id())
        .await
        .map_err(|e| store_error(e, "settings retrieval"))?;

    let settings = document
        .and_then(|doc| doc.get("settings").cloned())
        .unwrap_or_else(|| json!({}));

    Ok(ApiSuccess::new(settings))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Theme {
    Light,
    Dark,
    System,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    notifications: Option<bool>,
    #[serde(default)]
    auto_save: Option<bool>,
    #[serde(default)]
    cultural_analysis: Option<bool>,
    #[serde(default)]
    data_retention: Option<String>,
    #[serde(default)]
    sensitivity_level: Option<u8>,
    #[serde(default)]
    theme: Option<Theme>,
    #[serde(default)]
    focus_areas: Option<Vec<String>>,
}

impl Validate for UpdateSettingsRequest {
    fn validate(&self) -> Result<(), Violations> {
        let mut violations = Violations::new();
        if let Some(ref retention) = self.data_retention
            && retention.trim().is_empty()
        {
            violations.push("dataRetention", "must be a non-empty string");
        }
        if let Some(level) = self.sensitivity_level
            && !(1..=5).contains(&level)
        {
            violations.push("sensitivityLevel", "must be between 1 and 5");
        }
        if let Some(ref areas) = self.focus_areas {
            for (i, area) in areas.iter().enumerate() {
                if area.trim().is_empty() {
                    violations.push(format!("focusAreas[{i}]"), "must be a non-empty string");
                }
            }
        }
        violations.into_result()
    }
}

/// `PUT /api/settings`
///
/// Replaces the whole settings subdocument, upserting the profile on
/// first write.
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    ValidatedJson(body): ValidatedJson<UpdateSettingsRequest>,
) -> ApiResult<Value> {
    let settings = settings_value(&body);
    let profile_id = user.profile_id();
    let patch = json!({ "settings": settings });

    let updated = match state.inner.store.update(USERS, &profile_id, patch.clone()).await {
        Ok(updated) => updated,
        Err(StoreError::NotFound { .. }) => {
            let mut document = patch;
            if let Some(fields) = document.as_object_mut() {
                fields.insert("uid".to_owned(), json!(user.uid));
            }
            state
                .inner
                .store
                .create(USERS, &profile_id, document)
                .await
                .map_err(|e| store_error(e, "settings update"))?
        }
        Err(other) => return Err(store_error(other, "settings update")),
    };

    let settings = updated.get("settings").cloned().unwrap_or_else(|| json!({}));
    Ok(ApiSuccess::new(settings).with_message("settings updated"))
}

fn settings_value(body: &UpdateSettingsRequest) -> Value {
    let mut settings = serde_json::Map::new();
    if let Some(notifications) = body.notifications {
        settings.insert("notifications".to_owned(), json!(notifications));
    }
    if let Some(auto_save) = body.auto_save {
        settings.insert("autoSave".to_owned(), json!(auto_save));
    }
    if let Some(cultural_analysis) = body.cultural_analysis {
        settings.insert("culturalAnalysis".to_owned(), json!(cultural_analysis));
    }
    if let Some(ref data_retention) = body.data_retention {
        settings.insert("dataRetention".to_owned(), json!(data_retention));
    }
    if let Some(level) = body.sensitivity_level {
        settings.insert("sensitivityLevel".to_owned(), json!(level));
    }
    if let Some(ref theme) = body.theme {
        let label = match theme {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        };
        settings.insert("theme".to_owned(), json!(label));
    }
    if let Some(ref areas) = body.focus_areas {
        settings.insert("focusAreas".to_owned(), json!(areas));
    }
    Value::Object(settings)
}

/// `POST /api/user/export`
///
/// Everything the service holds for the caller as one JSON download.
pub async fn export(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
) -> Result<Response, ApiError> {
    let profile = state
        .inner
        .store
        .get(USERS, &user.profile_id())
        .await
        .map_err(|e| store_error(e, "profile retrieval"))?;
    let sessions = state
        .inner
        .store
        .query(SESSIONS, &[Filter::equals("userId", user.uid.clone())])
        .await
        .map_err(|e| store_error(e, "session listing"))?;
    let transcripts = state
        .inner
        .store
        .query(TRANSCRIPTS, &[Filter::equals("userId", user.uid.clone())])
        .await
        .map_err(|e| store_error(e, "transcript listing"))?;

    let export = json!({
        "exportedAt": Timestamp::now().to_string(),
        "profile": profile,
        "sessions": sessions,
        "transcripts": transcripts,
    });
    let body = serde_json::to_vec_pretty(&export)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("serializing export: {e}")))?;

    let filename = format!("culturelens-export-{}.json", user.uid);
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(axum::body::Body::from(body))
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("building export response: {e}")))?;

    Ok(response)
}

/// `POST /api/user/delete`
///
/// Removes the profile, every session, and the audio and transcripts
/// hanging off them. Blobs go first so a failure partway leaves no
/// session pointing at deleted audio.
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
) -> ApiResult<Value> {
    let sessions = state
        .inner
        .store
        .query(SESSIONS, &[Filter::equals("userId", user.uid.clone())])
        .await
        .map_err(|e| store_error(e, "session listing"))?;

    let mut deleted_sessions = 0usize;
    for session in &sessions {
        if let Some(audio_id) = session.get("audioId").and_then(Value::as_str) {
            state
                .inner
                .store
                .delete(AUDIO_FILES, audio_id)
                .await
                .map_err(|e| store_error(e, "audio deletion"))?;
        }
        if let Some(id) = session.get("id").and_then(Value::as_str) {
            state
                .inner
                .store
                .delete(SESSIONS, id)
                .await
                .map_err(|e| store_error(e, "session deletion"))?;
            deleted_sessions += 1;
        }
    }

    let transcripts = state
        .inner
        .store
        .query(TRANSCRIPTS, &[Filter::equals("userId", user.uid.clone())])
        .await
        .map_err(|e| store_error(e, "transcript listing"))?;
    for transcript in &transcripts {
        if let Some(id) = transcript.get("id").and_then(Value::as_str) {
            state
                .inner
                .store
                .delete(TRANSCRIPTS, id)
                .await
                .map_err(|e| store_error(e, "transcript deletion"))?;
        }
    }

    state
        .inner
        .store
        .delete(USERS, &user.profile_id())
        .await
        .map_err(|e| store_error(e, "profile deletion"))?;

    if let Some(ref limiter) = state.inner.limiter {
        limiter.reset_user(&user.uid);
    }

    tracing::info!(user_id = %user.uid, deleted_sessions, "account data deleted");
    Ok(ApiSuccess::new(json!({ "deletedSessions": deleted_sessions }))
        .with_message("account data deleted"))
}
