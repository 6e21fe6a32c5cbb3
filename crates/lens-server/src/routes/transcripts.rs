//! Transcript routes
//!
//! Transcripts are stored in their own collection and linked to the
//! session via `sessionId` in both directions. Ownership checks go
//! through the session, so a transcript is only ever visible to the
//! user who owns the conversation.

use std::sync::Arc;

use axum::Extension;
use axum::extract::State;
use jiff::Timestamp;
use lens_api::{ApiError, ApiResult, ApiSuccess, Validate, ValidatedJson, ValidatedQuery, Violations};
use lens_core::{Segment, VerifiedUser, collections::{SESSIONS, TRANSCRIPTS}, generate_doc_id};
use lens_store::Filter;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::state::AppState;

use super::{load_owned_session, store_error};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTranscriptRequest {
    session_id: String,
    transcript: String,
    #[serde(default)]
    timestamp: Option<Timestamp>,
    #[serde(default)]
    segments: Option<Vec<Segment>>,
}

impl Validate for CreateTranscriptRequest {
    fn validate(&self) -> Result<(), Violations> {
        let mut violations = Violations::new();
        if self.session_id.trim().is_empty() {
            violations.push("sessionId", "must be a non-empty string");
        }
        if self.transcript.trim().is_empty() {
            violations.push("transcript", "must be a non-empty string");
        }
        if let Some(ref segments) = self.segments {
            for (i, segment) in segments.iter().enumerate() {
                if segment.end_ms < segment.start_ms {
                    violations.push(format!("segments[{i}]"), "endMs must not precede startMs");
                }
            }
        }
        violations.into_result()
    }
}

/// `POST /api/transcripts`
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    ValidatedJson(body): ValidatedJson<CreateTranscriptRequest>,
) -> ApiResult<Value> {
    let session = load_owned_session(&state, &user, &body.session_id).await?;

    let id = generate_doc_id("transcript");
    let mut document = json!({
        "sessionId": session.id,
        "userId": user.uid,
        "transcript": body.transcript,
    });
    if let Some(fields) = document.as_object_mut() {
        if let Some(timestamp) = body.timestamp {
            fields.insert("timestamp".to_owned(), Value::String(timestamp.to_string()));
        }
        if let Some(segments) = body.segments {
            let segments = serde_json::to_value(segments)
                .map_err(|e| ApiError::database("transcript creation").with_details(e.to_string()))?;
            fields.insert("segments".to_owned(), segments);
        }
    }

    let stored = state
        .inner
        .store
        .create(TRANSCRIPTS, &id, document)
        .await
        .map_err(|e| store_error(e, "transcript creation"))?;

    state
        .inner
        .store
        .update(SESSIONS, &session.id, json!({ "transcriptId": id }))
        .await
        .map_err(|e| store_error(e, "session update"))?;

    tracing::info!(session_id = %session.id, transcript_id = %id, "transcript stored");
    Ok(ApiSuccess::created(stored).with_message("transcript stored"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TranscriptQuery {
    session_id: String,
}

impl Validate for TranscriptQuery {
    fn validate(&self) -> Result<(), Violations> {
        let mut violations = Violations::new();
        if self.session_id.trim().is_empty() {
            violations.push("sessionId", "must be a non-empty string");
        }
        violations.into_result()
    }
}

/// `GET /api/transcripts?sessionId=`
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    ValidatedQuery(query): ValidatedQuery<TranscriptQuery>,
) -> ApiResult<Vec<Value>> {
    let session = load_owned_session(&state, &user, &query.session_id).await?;

    let mut transcripts = state
        .inner
        .store
        .query(TRANSCRIPTS, &[Filter::equals("sessionId", session.id)])
        .await
        .map_err(|e| store_error(e, "transcript listing"))?;

    transcripts.sort_by(|a, b| {
        let key = |doc: &Value| doc.get("createdAt").and_then(Value::as_str).unwrap_or_default().to_owned();
        key(b).cmp(&key(a))
    });

    let count = transcripts.len();
    Ok(ApiSuccess::new(transcripts).with_meta(json!({ "count": count })))
}
