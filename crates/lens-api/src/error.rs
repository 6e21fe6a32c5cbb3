use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

use crate::respond::{ErrorBody, ErrorEnvelope};

/// Closed error taxonomy for the HTTP API
///
/// Each variant pins its HTTP status and machine-readable code; callers
/// discriminate by variant, never by message text. Constructing an error
/// performs no I/O and no logging. The one escape hatch is [`Internal`],
/// which wraps anything unexpected and renders as an opaque 500 so
/// internal details never reach clients.
///
/// [`Internal`]: ApiError::Internal
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed validation (400)
    #[error("{message}")]
    Validation {
        message: String,
        details: Option<String>,
    },

    /// Caller is not authenticated (401)
    #[error("{message}")]
    Authentication {
        message: String,
        details: Option<String>,
    },

    /// Caller is authenticated but not allowed (403)
    #[error("{message}")]
    Authorization {
        message: String,
        details: Option<String>,
    },

    /// Resource does not exist (404)
    #[error("{resource} not found")]
    NotFound { resource: String, id: Option<String> },

    /// Request conflicts with current state (409)
    #[error("{message}")]
    Conflict {
        message: String,
        details: Option<String>,
    },

    /// An upstream dependency failed (503)
    #[error("error communicating with {service}")]
    ExternalService {
        service: String,
        details: Option<String>,
    },

    /// The document store failed (503)
    #[error("database error during {operation}")]
    Database {
        operation: String,
        details: Option<String>,
    },

    /// Caller exceeded a rate limit (429)
    #[error("rate limit exceeded. try again in {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    /// Anything unexpected; logged server-side, opaque to the client (500)
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Validation failure with the given message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: None,
        }
    }

    /// Authentication failure with the default message
    pub fn authentication() -> Self {
        Self::Authentication {
            message: "authentication required".to_owned(),
            details: None,
        }
    }

    /// Authentication failure with a specific message
    pub fn authentication_message(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            details: None,
        }
    }

    /// Authorization failure with the default message
    pub fn authorization() -> Self {
        Self::Authorization {
            message: "insufficient permissions".to_owned(),
            details: None,
        }
    }

    /// Authorization failure with a specific message
    pub fn authorization_message(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
            details: None,
        }
    }

    /// Missing resource without a known id
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: None,
        }
    }

    /// Missing resource with the id that was looked up
    pub fn not_found_with_id(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: Some(id.into()),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            details: None,
        }
    }

    /// Failure talking to the named upstream service
    pub fn external_service(service: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            details: None,
        }
    }

    /// Store failure during the named operation
    pub fn database(operation: impl Into<String>) -> Self {
        Self::Database {
            operation: operation.into(),
            details: None,
        }
    }

    /// Attach detail text to variants that carry one
    ///
    /// No-op for `NotFound` (details derive from the id), `RateLimited`
    /// and `Internal`.
    #[must_use]
    pub fn with_details(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            Self::Validation { details, .. }
            | Self::Authentication { details, .. }
            | Self::Authorization { details, .. }
            | Self::Conflict { details, .. }
            | Self::ExternalService { details, .. }
            | Self::Database { details, .. } => *details = Some(text.into()),
            Self::NotFound { .. } | Self::RateLimited { .. } | Self::Internal(_) => {}
        }
        self
    }

    /// HTTP status for this error
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Authentication { .. } => StatusCode::UNAUTHORIZED,
            Self::Authorization { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::ExternalService { .. } | Self::Database { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Authentication { .. } => "UNAUTHORIZED",
            Self::Authorization { .. } => "FORBIDDEN",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { .. } => "CONFLICT",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Database { .. } => "DATABASE_ERROR",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to expose to API consumers
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "an unexpected error occurred".to_owned(),
            other => other.to_string(),
        }
    }

    /// Supporting detail, when present
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Validation { details, .. }
            | Self::Authentication { details, .. }
            | Self::Authorization { details, .. }
            | Self::Conflict { details, .. }
            | Self::ExternalService { details, .. }
            | Self::Database { details, .. } => details.clone(),
            Self::NotFound { resource, id } => {
                id.as_ref().map(|id| format!("{resource} with id {id}"))
            }
            Self::RateLimited { .. } | Self::Internal(_) => None,
        }
    }

    /// Actionable advice for the caller, when there is any
    pub const fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ExternalService { .. } | Self::Database { .. } => Some("please try again later"),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Unexpected errors are the only ones worth a server-side error
        // log; everything else is regular request flow.
        if let Self::Internal(ref source) = self {
            tracing::error!(error = ?source, "unexpected internal error");
        }

        let envelope = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: self.code().to_owned(),
                message: self.client_message(),
                details: self.details(),
                hint: self.hint().map(str::to_owned),
            },
        };

        let mut response = (self.status(), Json(envelope)).into_response();

        if let Self::RateLimited { retry_after } = self
            && let Ok(value) = retry_after.to_string().parse()
        {
            response.headers_mut().insert(http::header::RETRY_AFTER, value);
        }

        response
    }
}
