//! Voice routes: debrief synthesis and agent signed URLs
//!
//! Synthesized audio goes through the blob store with a short expiry
//! and is served back through the audio route, so the provider response
//! never streams straight to the client.

use std::sync::Arc;

use axum::Extension;
use axum::extract::State;
use lens_api::{ApiError, ApiResult, ApiSuccess, Validate, ValidatedJson, Violations};
use lens_core::VerifiedUser;
use lens_store::StoreError;
use serde::Deserialize;
use serde_json::{Value, json};
use speech::SpeechError;

use crate::rate_limit::check_route_limit;
use crate::state::AppState;

use super::store_error;

const MAX_TTS_CHARS: usize = 5_000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TtsRequest {
    text: String,
    #[serde(default)]
    voice_id: Option<String>,
}

impl Validate for TtsRequest {
    fn validate(&self) -> Result<(), Violations> {
        let mut violations = Violations::new();
        if self.text.trim().is_empty() {
            violations.push("text", "must be a non-empty string");
        } else if self.text.chars().count() > MAX_TTS_CHARS {
            violations.push("text", format!("must be at most {MAX_TTS_CHARS} characters"));
        }
        if let Some(ref voice_id) = self.voice_id
            && voice_id.trim().is_empty()
        {
            violations.push("voiceId", "must be a non-empty string");
        }
        violations.into_result()
    }
}

/// `POST /api/tts`
pub async fn synthesize(
    State(state): State<AppState>,
    Extension(user): Extension<Arc<VerifiedUser>>,
    ValidatedJson(body): ValidatedJson<TtsRequest>,
) -> ApiResult<Value> {
    check_route_limit(state.inner.limiter.as_ref(), "tts", &user.uid)?;

    let synthesis = state
        .inner
        .speech
        .synthesize(&body.text, body.voice_id.as_deref())
        .await
        .map_err(speech_error)?;

    let handle = state
        .inner
        .blobs
        .store(
            &synthesis.audio,
            &synthesis.content_type,
            Some(state.inner.tts_audio_ttl_days),
        )
        .await
        .map_err(|e| match e {
            StoreError::Oversize { .. } => ApiError::validation(e.to_string()),
            other => store_error(other, "audio storage"),
        })?;

    tracing::info!(audio_id = %handle.id, bytes = handle.size, user_id = %user.uid, "speech synthesized");
    Ok(ApiSuccess::new(json!({
        "audioId": handle.id,
        "audioUrl": format!("/api/audio/{}", handle.id),
        "contentType": synthesis.content_type,
        "size": handle.size,
    })))
}

/// `GET /api/agent/signed-url`
pub async fn signed_url(State(state): State<AppState>) -> ApiResult<speech::SignedUrl> {
    let signed = state.inner.speech.signed_url().await.map_err(speech_error)?;
    Ok(ApiSuccess::new(signed))
}

/// Map provider failures onto the API taxonomy
///
/// Missing key permissions are an operator problem, not a provider
/// outage, so they surface as an auth error with the upstream detail.
fn speech_error(error: SpeechError) -> ApiError {
    match error {
        SpeechError::NotConfigured => ApiError::external_service("elevenlabs configuration"),
        SpeechError::MissingPermissions { detail } => {
            ApiError::authentication_message("the ElevenLabs API key is missing required permissions")
                .with_details(detail)
        }
        SpeechError::Api { status, message } => ApiError::external_service("elevenlabs api")
            .with_details(format!("status {status}: {message}")),
        SpeechError::Connection(e) => ApiError::external_service("elevenlabs").with_details(e.to_string()),
    }
}
