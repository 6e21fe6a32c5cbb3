#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! API contract layer for the CultureLens backend
//!
//! Every endpoint speaks the same envelope: `{"success": true, "data": ...}`
//! on success, `{"success": false, "error": {...}}` on failure. Handlers
//! return [`ApiResult`] and never build responses by hand; the
//! `IntoResponse` impls here are the single place envelopes are produced.

mod error;
mod respond;
mod validate;

pub use error::ApiError;
pub use respond::{ApiResult, ApiSuccess, ErrorBody, ErrorEnvelope, SuccessEnvelope};
pub use validate::{Validate, ValidatedJson, ValidatedQuery, Violations, require_id};
