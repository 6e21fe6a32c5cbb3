use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// ElevenLabs voice synthesis configuration
///
/// With no `api_key`, speech routes answer with a service error instead
/// of failing startup, matching the behavior of the other providers.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeechConfig {
    /// ElevenLabs API key
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Conversational agent id for signed realtime sessions
    #[serde(default)]
    pub agent_id: Option<String>,

    /// Override the API base URL (used by tests)
    #[serde(default)]
    pub base_url: Option<Url>,

    /// Voice used when a request does not specify one
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Synthesis model
    #[serde(default = "default_model")]
    pub model: String,

    /// Days before stored debrief audio expires
    #[serde(default = "default_audio_ttl_days")]
    pub audio_ttl_days: u32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            agent_id: None,
            base_url: None,
            default_voice: default_voice(),
            model: default_model(),
            audio_ttl_days: default_audio_ttl_days(),
        }
    }
}

fn default_voice() -> String {
    "21m00Tcm4TlvDq8ikWAM".to_string()
}

fn default_model() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_audio_ttl_days() -> u32 {
    1
}
