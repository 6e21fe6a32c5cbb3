use serde::{Deserialize, Serialize};

/// Raw audio returned by the voice provider
#[derive(Debug, Clone)]
pub struct Synthesis {
    /// Raw audio bytes
    pub audio: Vec<u8>,
    /// Content type of the audio (e.g. "audio/mpeg")
    pub content_type: String,
}

/// Signed realtime session URL for a private conversational agent
///
/// Field name matches the ElevenLabs response so it can pass through
/// to the client untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedUrl {
    pub signed_url: String,
}
