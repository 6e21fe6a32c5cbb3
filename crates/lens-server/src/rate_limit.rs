use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use lens_api::ApiError;
use lens_core::VerifiedUser;
use lens_ratelimit::{RateLimitError, RequestLimiter};

/// Enforce per-IP and per-user request limits
///
/// Runs after authentication so the verified identity is available;
/// unauthenticated traffic (public paths) is covered by the IP scope
/// alone.
pub async fn rate_limit_middleware(
    limiter: Arc<RequestLimiter>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(ip) = extract_client_ip(&request)
        && let Err(e) = limiter.check_ip(&ip)
    {
        return limit_response(e);
    }

    if let Some(user) = request.extensions().get::<Arc<VerifiedUser>>()
        && let Err(e) = limiter.check_user(&user.uid)
    {
        return limit_response(e);
    }

    next.run(request).await
}

/// Check a named route limit for expensive handlers
///
/// No-op when rate limiting is not configured.
pub fn check_route_limit(
    limiter: Option<&Arc<RequestLimiter>>,
    route: &str,
    user_id: &str,
) -> Result<(), ApiError> {
    if let Some(limiter) = limiter {
        limiter.check_route(route, user_id).map_err(limit_error)?;
    }
    Ok(())
}

fn extract_client_ip(request: &Request) -> Option<String> {
    // Try X-Forwarded-For first
    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(first) = val.split(',').next()
    {
        return Some(first.trim().to_string());
    }

    // Try X-Real-IP
    if let Some(real_ip) = request.headers().get("x-real-ip")
        && let Ok(val) = real_ip.to_str()
    {
        return Some(val.trim().to_string());
    }

    None
}

fn limit_response(error: RateLimitError) -> Response {
    limit_error(error).into_response()
}

fn limit_error(error: RateLimitError) -> ApiError {
    match error {
        RateLimitError::Exceeded { retry_after } => ApiError::RateLimited { retry_after },
        RateLimitError::Config(message) => {
            ApiError::Internal(anyhow::anyhow!("rate limiter misconfigured: {message}"))
        }
    }
}
