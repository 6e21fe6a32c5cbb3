use thiserror::Error;

pub type Result<T> = std::result::Result<T, SpeechError>;

/// Voice provider errors
#[derive(Debug, Error)]
pub enum SpeechError {
    /// API key or agent id missing from configuration
    #[error("speech provider not configured")]
    NotConfigured,

    /// The API key lacks the conversational agent permission scope
    #[error("API key missing required permission")]
    MissingPermissions {
        /// Upstream explanation of the missing scope
        detail: String,
    },

    /// ElevenLabs returned a non-success response
    #[error("elevenlabs API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// HTTP request to ElevenLabs failed
    #[error("failed to reach elevenlabs: {0}")]
    Connection(#[from] reqwest::Error),
}
