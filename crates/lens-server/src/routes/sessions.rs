//! Session lifecycle routes
//!
//! Sessions move `recording → processing → ready` (or `failed`); audio
//! upload drives the first transition and analysis the second. Every
//! route is scoped to the owning user.

use std::sync::Arc;

use axum::Extension;
use axum::extract::{Path, Request, State};
use jiff::Timestamp;
use lens_api::{ApiError, ApiResult, ApiSuccess, Validate, ValidatedJson, ValidatedQuery, Violations};
use lens_core::{
    AnalysisDepth, AnalysisResult, Consent, Segment, Session, SessionSettings, SessionStatus,
    Speaker, StorageMode, VerifiedUser, collections::{AUDIO_FILES, SESSIONS, TRANSCRIPTS},
    generate_doc_id,
};
use lens_store::{Filter, StoreError};
use serde::Deserialize;
use serde_json::json;

use crate::rate_limit::check_route_limit;
use crate::state::AppState;

use super::{load_owned_session, store_error};

/// Raw audio upload limit, comfortably above the blob-store ceiling so
/// the store's own oversize message is the one clients see
const UPLOAD_LIMIT_BYTES: usize = 2 << 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSessionRequest {
    consent: ConsentInput,
    settings: SettingsInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConsentInput {
    person_a: bool,
    person_b: bool,
    #[serde(default)]
    timestamp: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SettingsInput {
    storage_mode: StorageMode,
    voice_id: String,
    analysis_depth: AnalysisDepth,
    #[serde(default)]
    cultural_context_tags: Vec<String>,
    sensitivity_level: u8,
}

impl Validate for CreateSessionRequest {
    fn validate(&self) -> Result<(), Violations> {
        let mut violations = Violations::new();
        if !self.consent.person_a {
            violations.push("consent.personA", "both parties must consent to recording");
        }
        if !self.consent.person_b {
            violations.push("consent.personB", "both parties must consent to recording");
        }
        if self.settings.voice_id.trim().is_empty() {
            violations.push("settings.voiceId", "must be a non-empty string");
        }
        if self.settings.sensitivity_level > 100 {
            violations.push("settings.sensitivityLevel", "must be between 0 and 100");
        }
        for (i, tag) in self.settings.cultural_context_tags.iter().enumerate() {
            if tag.trim().is_empty() {
                violations.push(format!("settings.culturalContextTags[{i}]"), "must be a non-empty string");
            }
        }
        violations.into_result()
    }
}

/// `POST /api/sessions`
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    ValidatedJson(body): ValidatedJson<CreateSessionRequest>,
) -> ApiResult<Session> {
    let now = Timestamp::now();
    let session = Session {
        id: generate_doc_id("session"),
        user_id: user.uid.clone(),
        consent: Consent {
            person_a: body.consent.person_a,
            person_b: body.consent.person_b,
            timestamp: Some(body.consent.timestamp.unwrap_or(now)),
        },
        settings: SessionSettings {
            storage_mode: body.settings.storage_mode,
            voice_id: body.settings.voice_id,
            analysis_depth: body.settings.analysis_depth,
            cultural_context_tags: body.settings.cultural_context_tags,
            sensitivity_level: body.settings.sensitivity_level,
        },
        status: SessionStatus::Recording,
        is_favorite: false,
        duration: None,
        audio_id: None,
        transcript_id: None,
        analysis: None,
        created_at: now,
        updated_at: now,
    };

    let value = serde_json::to_value(&session)
        .map_err(|e| ApiError::database("session creation").with_details(e.to_string()))?;
    let stored = state
        .inner
        .store
        .create(SESSIONS, &session.id, value)
        .await
        .map_err(|e| store_error(e, "session creation"))?;
    let session = parse_session(stored)?;

    tracing::info!(session_id = %session.id, user_id = %user.uid, "session created");
    Ok(ApiSuccess::created(session).with_message("session created"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListQuery {
    #[serde(default)]
    status: Option<SessionStatus>,
}

impl Validate for ListQuery {
    fn validate(&self) -> Result<(), Violations> {
        Ok(())
    }
}

/// `GET /api/sessions`
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> ApiResult<Vec<Session>> {
    let mut filters = vec![Filter::equals("userId", user.uid.clone())];
    if let Some(status) = query.status {
        let value = serde_json::to_value(status)
            .map_err(|e| ApiError::database("session listing").with_details(e.to_string()))?;
        filters.push(Filter::equals("status", value));
    }

    let documents = state
        .inner
        .store
        .query(SESSIONS, &filters)
        .await
        .map_err(|e| store_error(e, "session listing"))?;

    let mut sessions = documents
        .into_iter()
        .map(parse_session)
        .collect::<Result<Vec<_>, _>>()?;
    sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let count = sessions.len();
    Ok(ApiSuccess::new(sessions).with_meta(json!({ "count": count })))
}

/// `GET /api/sessions/{id}`
pub async fn fetch(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    Path(id): Path<String>,
) -> ApiResult<Session> {
    let session = load_owned_session(&state, &user, &id).await?;
    Ok(ApiSuccess::new(session))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSessionRequest {
    #[serde(default)]
    status: Option<SessionStatus>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    audio_id: Option<String>,
}

impl Validate for UpdateSessionRequest {
    fn validate(&self) -> Result<(), Violations> {
        let mut violations = Violations::new();
        if self.status.is_none() && self.duration.is_none() && self.audio_id.is_none() {
            violations.push("body", "at least one field must be provided");
        }
        if let Some(duration) = self.duration
            && duration < 0.0
        {
            violations.push("duration", "must not be negative");
        }
        if let Some(ref audio_id) = self.audio_id
            && audio_id.trim().is_empty()
        {
            violations.push("audioId", "must be a non-empty string");
        }
        violations.into_result()
    }
}

/// `PATCH /api/sessions/{id}`
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateSessionRequest>,
) -> ApiResult<Session> {
    load_owned_session(&state, &user, &id).await?;

    let mut patch = serde_json::Map::new();
    if let Some(status) = body.status {
        let value = serde_json::to_value(status)
            .map_err(|e| ApiError::database("session update").with_details(e.to_string()))?;
        patch.insert("status".to_owned(), value);
    }
    if let Some(duration) = body.duration {
        patch.insert("duration".to_owned(), json!(duration));
    }
    if let Some(audio_id) = body.audio_id {
        patch.insert("audioId".to_owned(), json!(audio_id));
    }

    let updated = state
        .inner
        .store
        .update(SESSIONS, &id, serde_json::Value::Object(patch))
        .await
        .map_err(|e| store_error(e, "session update"))?;

    Ok(ApiSuccess::new(parse_session(updated)?))
}

/// `DELETE /api/sessions/{id}`
///
/// Also removes the session's audio blob and transcripts, so nothing
/// orphaned is left behind in the other collections.
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    let session = load_owned_session(&state, &user, &id).await?;

    if let Some(ref audio_id) = session.audio_id {
        state
            .inner
            .store
            .delete(AUDIO_FILES, audio_id)
            .await
            .map_err(|e| store_error(e, "audio deletion"))?;
    }

    let transcripts = state
        .inner
        .store
        .query(TRANSCRIPTS, &[Filter::equals("sessionId", id.clone())])
        .await
        .map_err(|e| store_error(e, "transcript listing"))?;
    for transcript in &transcripts {
        if let Some(transcript_id) = transcript.get("id").and_then(serde_json::Value::as_str) {
            state
                .inner
                .store
                .delete(TRANSCRIPTS, transcript_id)
                .await
                .map_err(|e| store_error(e, "transcript deletion"))?;
        }
    }

    state
        .inner
        .store
        .delete(SESSIONS, &id)
        .await
        .map_err(|e| store_error(e, "session deletion"))?;

    tracing::info!(session_id = %id, user_id = %user.uid, "session deleted");
    Ok(ApiSuccess::new(json!({ "id": id })).with_message("session deleted"))
}

/// `PATCH /api/sessions/{id}/favorite`
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    Path(id): Path<String>,
) -> ApiResult<Session> {
    let session = load_owned_session(&state, &user, &id).await?;

    let updated = state
        .inner
        .store
        .update(SESSIONS, &id, json!({ "isFavorite": !session.is_favorite }))
        .await
        .map_err(|e| store_error(e, "session update"))?;

    Ok(ApiSuccess::new(parse_session(updated)?))
}

/// `POST /api/sessions/{id}/upload`
///
/// Takes the raw recording as the request body. Storing happens before
/// the session is touched, so an oversize payload leaves the session in
/// its previous state.
pub async fn upload_audio(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    Path(id): Path<String>,
    request: Request,
) -> ApiResult<Session> {
    let session = load_owned_session(&state, &user, &id).await?;
    if session.status != SessionStatus::Recording {
        return Err(ApiError::conflict("session is not in recording state")
            .with_details(format!("cannot upload audio to a {} session", status_label(session.status))));
    }

    let content_type = request
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    if !content_type.starts_with("audio/") {
        return Err(ApiError::validation("invalid audio upload")
            .with_details("expected an audio/* content type"));
    }

    let payload = axum::body::to_bytes(request.into_body(), UPLOAD_LIMIT_BYTES)
        .await
        .map_err(|e| {
            ApiError::validation("invalid audio upload").with_details(e.to_string())
        })?;
    if payload.is_empty() {
        return Err(ApiError::validation("invalid audio upload").with_details("request body is empty"));
    }

    let handle = state
        .inner
        .blobs
        .store(&payload, &content_type, None)
        .await
        .map_err(|e| match e {
            StoreError::Oversize { .. } => ApiError::validation(e.to_string()),
            other => store_error(other, "audio storage"),
        })?;

    let updated = state
        .inner
        .store
        .update(
            SESSIONS,
            &id,
            json!({ "audioId": handle.id, "status": "processing" }),
        )
        .await
        .map_err(|e| store_error(e, "session update"))?;

    tracing::info!(session_id = %id, audio_id = %handle.id, bytes = handle.size, "audio uploaded");
    Ok(ApiSuccess::new(parse_session(updated)?).with_message("audio uploaded"))
}

/// `POST /api/sessions/{id}/analyze`
pub async fn analyze(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    Path(id): Path<String>,
) -> ApiResult<AnalysisResult> {
    check_route_limit(state.inner.limiter.as_ref(), "analyze", &user.uid)?;

    let session = load_owned_session(&state, &user, &id).await?;
    let segments = transcript_segments(&state, &session).await?;

    let result = state
        .inner
        .engine
        .analyze(segments, &session.settings.cultural_context_tags)
        .await;

    let analysis = serde_json::to_value(&result)
        .map_err(|e| ApiError::database("session update").with_details(e.to_string()))?;
    state
        .inner
        .store
        .update(SESSIONS, &id, json!({ "analysis": analysis, "status": "ready" }))
        .await
        .map_err(|e| store_error(e, "session update"))?;

    tracing::info!(session_id = %id, insights = result.insights.len(), "analysis complete");
    Ok(ApiSuccess::new(result).with_message("analysis complete"))
}

/// `GET /api/sessions/{id}/analyze`
pub async fn fetch_analysis(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    Path(id): Path<String>,
) -> ApiResult<AnalysisResult> {
    let session = load_owned_session(&state, &user, &id).await?;
    let analysis = session
        .analysis
        .ok_or_else(|| ApiError::not_found("analysis"))?;
    Ok(ApiSuccess::new(analysis))
}

/// Load the session's transcript as segments
///
/// A transcript stored without diarized segments becomes one segment
/// carrying the full text, so analysis still runs.
async fn transcript_segments(state: &AppState, session: &Session) -> Result<Vec<Segment>, ApiError> {
    let document = match session.transcript_id {
        Some(ref transcript_id) => state
            .inner
            .store
            .get(TRANSCRIPTS, transcript_id)
            .await
            .map_err(|e| store_error(e, "transcript retrieval"))?,
        None => None,
    };
    let document = document.ok_or_else(|| ApiError::not_found("transcript"))?;

    if let Some(raw) = document.get("segments")
        && raw.as_array().is_some_and(|segments| !segments.is_empty())
    {
        return serde_json::from_value(raw.clone())
            .map_err(|e| ApiError::database("transcript retrieval").with_details(e.to_string()));
    }

    let text = document
        .get("transcript")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_owned();

    Ok(vec![Segment {
        start_ms: 0,
        end_ms: 0,
        speaker: Speaker::Unknown,
        text,
        confidence: None,
    }])
}

fn parse_session(value: serde_json::Value) -> Result<Session, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::database("session retrieval").with_details(e.to_string()))
}

const fn status_label(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Recording => "recording",
        SessionStatus::Uploading => "uploading",
        SessionStatus::Processing => "processing",
        SessionStatus::Ready => "ready",
        SessionStatus::Failed => "failed",
    }
}
