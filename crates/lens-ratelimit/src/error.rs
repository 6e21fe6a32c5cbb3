use thiserror::Error;

/// Rate limiting errors
#[derive(Debug, Error)]
pub enum RateLimitError {
    /// Configuration error
    #[error("rate limit configuration error: {0}")]
    Config(String),

    /// Rate limit exceeded
    #[error("rate limit exceeded. try again in {retry_after} seconds")]
    Exceeded {
        /// Seconds until the window turns over, rounded up
        retry_after: u64,
    },
}
