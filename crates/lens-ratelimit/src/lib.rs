#![allow(clippy::missing_errors_doc, clippy::must_use_candidate)]

//! Fixed-window request rate limiting
//!
//! Counters live in process memory, keyed by identity. Each identity
//! gets at most `requests` calls per window; the first call past the
//! limit is rejected with the seconds remaining until the window turns
//! over.

mod error;
mod request;
mod window;

pub use error::RateLimitError;
pub use request::RequestLimiter;
pub use window::FixedWindowLimiter;

use lens_config::RateLimitConfig;

/// Create a request limiter from configuration
pub fn create_request_limiter(config: &RateLimitConfig) -> Result<RequestLimiter, RateLimitError> {
    RequestLimiter::new(config)
}
