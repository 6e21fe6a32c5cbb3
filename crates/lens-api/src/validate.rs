use std::fmt;

use axum::body::Body;
use axum::extract::{FromRequest, FromRequestParts, Query};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Semantic validation on top of successful deserialization
///
/// Implementations check the constraints serde cannot express (value
/// ranges, cross-field rules) and report every violation at once. A
/// request is applied all-or-nothing: any violation rejects the whole
/// body.
pub trait Validate {
    fn validate(&self) -> Result<(), Violations>;
}

/// Ordered list of constraint violations
///
/// Renders as `"path: constraint, path2: constraint2"`, matching the
/// detail format clients already parse.
#[derive(Debug, Default)]
pub struct Violations(Vec<Violation>);

#[derive(Debug)]
struct Violation {
    path: String,
    constraint: String,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation at `path` (dot-separated for nested fields)
    pub fn push(&mut self, path: impl Into<String>, constraint: impl Into<String>) {
        self.0.push(Violation {
            path: path.into(),
            constraint: constraint.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when nothing was recorded, `Err(self)` otherwise
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", violation.path, violation.constraint)?;
        }
        Ok(())
    }
}

/// Body limit for JSON requests (1 MiB)
const BODY_LIMIT_BYTES: usize = 1 << 20;

static APPLICATION_JSON: http::HeaderValue = http::HeaderValue::from_static("application/json");

/// JSON body extractor that deserializes and then validates
///
/// Enforces the `application/json` content type and the body size limit
/// before parsing. Every failure mode rejects with a
/// `VALIDATION_ERROR` envelope; nothing downstream runs on a bad body.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();

        if parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .is_none_or(|value| value != APPLICATION_JSON)
        {
            return Err(ApiError::validation("invalid request body")
                .with_details("expected content-type application/json"));
        }

        let bytes = axum::body::to_bytes(body, BODY_LIMIT_BYTES).await.map_err(|err| {
            if std::error::Error::source(&err)
                .is_some_and(|source| source.is::<http_body_util::LengthLimitError>())
            {
                ApiError::validation("request body too large")
                    .with_details(format!("limit is {BODY_LIMIT_BYTES} bytes"))
            } else {
                ApiError::validation("invalid request body").with_details(err.to_string())
            }
        })?;

        let value = serde_json::from_slice::<T>(&bytes).map_err(|err| {
            ApiError::validation("request validation failed").with_details(err.to_string())
        })?;

        value.validate().map_err(|violations| {
            ApiError::validation("request validation failed").with_details(violations.to_string())
        })?;

        Ok(Self(value))
    }
}

/// Query string extractor that deserializes and then validates
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|err| {
                ApiError::validation("query parameter validation failed")
                    .with_details(err.body_text())
            })?;

        value.validate().map_err(|violations| {
            ApiError::validation("query parameter validation failed")
                .with_details(violations.to_string())
        })?;

        Ok(Self(value))
    }
}

/// Reject empty path/query identifiers before they reach the store
pub fn require_id(value: &str, name: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation("parameter validation failed")
            .with_details(format!("{name}: must be a non-empty string")));
    }
    Ok(())
}
