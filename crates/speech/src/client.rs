use lens_config::SpeechConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{
    error::{Result, SpeechError},
    http_client::http_client,
    types::{SignedUrl, Synthesis},
};

const DEFAULT_API_URL: &str = "https://api.elevenlabs.io/v1";

/// Client for the ElevenLabs synthesis and conversational agent APIs
pub struct ElevenLabsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    agent_id: Option<String>,
    default_voice: String,
    model: String,
}

#[derive(serde::Serialize)]
struct SynthesisBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(serde::Serialize)]
struct VoiceSettings {
    stability: f64,
    similarity_boost: f64,
}

impl ElevenLabsClient {
    pub fn new(config: &SpeechConfig) -> Self {
        let base_url = config.base_url.as_ref().map_or_else(
            || DEFAULT_API_URL.to_string(),
            |url| url.as_str().trim_end_matches('/').to_string(),
        );

        Self {
            client: http_client(),
            base_url,
            api_key: config.api_key.clone(),
            agent_id: config.agent_id.clone(),
            default_voice: config.default_voice.clone(),
            model: config.model.clone(),
        }
    }

    /// Synthesize text into audio with the configured model
    ///
    /// Falls back to the configured default voice when the caller does
    /// not pick one.
    pub async fn synthesize(&self, text: &str, voice_id: Option<&str>) -> Result<Synthesis> {
        let Some(ref api_key) = self.api_key else {
            return Err(SpeechError::NotConfigured);
        };

        let voice = voice_id.unwrap_or(&self.default_voice);
        let url = format!("{}/text-to-speech/{voice}", self.base_url);

        tracing::debug!(voice, input_len = text.len(), "requesting synthesis");

        let body = SynthesisBody {
            text,
            model_id: &self.model,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "synthesis failed: {body}");
            return Err(classify_error(status.as_u16(), &body));
        }

        let content_type = response
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/mpeg")
            .to_string();

        let audio = response.bytes().await?;

        tracing::debug!(bytes = audio.len(), "synthesis complete");

        Ok(Synthesis {
            audio: audio.to_vec(),
            content_type,
        })
    }

    /// Mint a signed realtime URL for the private conversational agent
    pub async fn signed_url(&self) -> Result<SignedUrl> {
        let (Some(api_key), Some(agent_id)) = (&self.api_key, &self.agent_id) else {
            return Err(SpeechError::NotConfigured);
        };

        let url = format!("{}/convai/conversation/get-signed-url", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("agent_id", agent_id.as_str())])
            .header("xi-api-key", api_key.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "signed URL request failed: {body}");
            return Err(classify_error(status.as_u16(), &body));
        }

        Ok(response.json().await?)
    }
}

#[derive(Deserialize)]
struct UpstreamError {
    detail: Option<UpstreamDetail>,
}

#[derive(Deserialize)]
struct UpstreamDetail {
    status: Option<String>,
    message: Option<String>,
}

/// Classify a non-success ElevenLabs response body
///
/// The permission case gets its own variant so routes can tell the
/// operator how to fix their key instead of reporting a generic
/// provider failure.
fn classify_error(status: u16, body: &str) -> SpeechError {
    let detail = serde_json::from_str::<UpstreamError>(body)
        .ok()
        .and_then(|e| e.detail);

    if let Some(ref detail) = detail
        && detail.status.as_deref() == Some("missing_permissions")
    {
        return SpeechError::MissingPermissions {
            detail: detail
                .message
                .clone()
                .unwrap_or_else(|| "the API key lacks the convai_write scope".to_string()),
        };
    }

    let message = detail
        .and_then(|d| d.message)
        .unwrap_or_else(|| format!("status {status}: {body}"));

    SpeechError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> ElevenLabsClient {
        ElevenLabsClient::new(&SpeechConfig::default())
    }

    #[tokio::test]
    async fn synthesize_without_key_is_not_configured() {
        let err = unconfigured().synthesize("hello", None).await.unwrap_err();
        assert!(matches!(err, SpeechError::NotConfigured));
    }

    #[tokio::test]
    async fn signed_url_without_agent_is_not_configured() {
        let err = unconfigured().signed_url().await.unwrap_err();
        assert!(matches!(err, SpeechError::NotConfigured));
    }

    #[test]
    fn classifies_missing_permissions() {
        let body = r#"{"detail":{"status":"missing_permissions","message":"needs convai_write"}}"#;
        let err = classify_error(401, body);
        match err {
            SpeechError::MissingPermissions { detail } => assert_eq!(detail, "needs convai_write"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn classifies_detail_message() {
        let body = r#"{"detail":{"status":"voice_not_found","message":"no such voice"}}"#;
        match classify_error(404, body) {
            SpeechError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "no such voice");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn falls_back_to_raw_body() {
        match classify_error(500, "gateway timeout") {
            SpeechError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "status 500: gateway timeout");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
