use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use lens_api::ApiError;
use lens_auth::{AuthError, TokenVerifier};
use lens_core::VerifiedUser;

/// Authenticate requests via bearer token
///
/// Skips configured public paths. Everywhere else the request must
/// carry `Authorization: Bearer <token>`; the verified identity is
/// inserted into request extensions for handlers and the rate limiter.
pub async fn auth_middleware(
    verifier: TokenVerifier,
    public_paths: Vec<String>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if public_paths.iter().any(|p| path.starts_with(p)) {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        return ApiError::authentication_message("missing authorization header").into_response();
    };

    match verifier.verify(token).await {
        Ok(user) => {
            let mut request = request;
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "token verification failed");
            auth_error(&e).into_response()
        }
    }
}

/// Stand-in identity for deployments without an `[auth]` section
///
/// Every request shares one local user so the data routes stay usable
/// in development and tests.
pub async fn local_identity_middleware(
    user: Arc<VerifiedUser>,
    request: Request,
    next: Next,
) -> Response {
    let mut request = request;
    request.extensions_mut().insert(user);
    next.run(request).await
}

fn auth_error(error: &AuthError) -> ApiError {
    match error {
        AuthError::InvalidToken => ApiError::authentication_message("invalid or expired token"),
        AuthError::VerificationFailed(_) | AuthError::Identity { .. } => {
            ApiError::external_service("identity")
        }
    }
}
