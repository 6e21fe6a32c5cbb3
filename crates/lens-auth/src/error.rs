/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Token was rejected by the identity service
    #[error("invalid or expired token")]
    InvalidToken,

    /// HTTP request to the identity service failed
    #[error("token verification failed: {0}")]
    VerificationFailed(#[from] reqwest::Error),

    /// Identity service returned an unexpected response
    #[error("identity service error ({status}): {message}")]
    Identity {
        /// HTTP status code
        status: u16,
        /// Error message from the identity service
        message: String,
    },
}
