//! Bearer token verification against the identity service
//!
//! Tokens are minted client-side by the identity provider and verified
//! server-side with one call per token, cached for the configured TTL.

mod error;
mod verifier;

pub use error::AuthError;
pub use verifier::TokenVerifier;
