use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// What every handler returns
pub type ApiResult<T> = Result<ApiSuccess<T>, ApiError>;

/// A successful response waiting to be enveloped
///
/// Defaults to 200; creation endpoints use [`ApiSuccess::created`] for
/// 201. `message` and `meta` are optional decoration and are omitted
/// from the body entirely when unset.
#[derive(Debug)]
pub struct ApiSuccess<T> {
    data: T,
    message: Option<String>,
    meta: Option<Value>,
    status: StatusCode,
}

impl<T: Serialize> ApiSuccess<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            message: None,
            meta: None,
            status: StatusCode::OK,
        }
    }

    /// Success with 201 Created
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::new(data)
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach response metadata (pagination counts and the like)
    #[must_use]
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        let envelope = SuccessEnvelope {
            success: true,
            data: self.data,
            message: self.message,
            meta: self.meta,
        };

        (self.status, Json(envelope)).into_response()
    }
}

/// Wire shape of a success response
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessEnvelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Wire shape of an error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}
