use thiserror::Error;

/// Errors that can occur while generating insights
#[derive(Debug, Error)]
pub enum InsightError {
    /// No analysis API key is configured
    #[error("analysis provider not configured")]
    NotConfigured,

    /// The analysis API returned an error response
    #[error("analysis API error ({status}): {message}")]
    Api {
        /// HTTP status returned by the API
        status: u16,
        /// Error detail extracted from the response body
        message: String,
    },

    /// The analysis API responded with something we could not interpret
    #[error("unexpected analysis response: {0}")]
    Malformed(String),

    /// Failed to reach the analysis API
    #[error("analysis request failed: {0}")]
    Connection(#[from] reqwest::Error),
}
