use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use http::{HeaderValue, StatusCode};
use lens_core::collections::USERS;
use serde::Serialize;

use crate::state::AppState;

/// Reported state of one dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
    Down,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceCheck {
    status: ServiceStatus,
    latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceCheck {
    const fn healthy(latency_ms: u64) -> Self {
        Self {
            status: ServiceStatus::Healthy,
            latency_ms,
            error: None,
        }
    }

    fn down(latency_ms: u64, error: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Down,
            latency_ms,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceReport {
    api: ServiceCheck,
    storage: ServiceCheck,
    identity: ServiceCheck,
    gemini: ServiceCheck,
    elevenlabs: ServiceCheck,
}

/// Monitoring shape, deliberately not the API envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: ServiceStatus,
    timestamp: String,
    version: &'static str,
    uptime_seconds: u64,
    services: ServiceReport,
    environment: String,
}

/// Health check handler
///
/// 200 only when every dependency is healthy, 503 otherwise. The body
/// is always the full report so monitors can see which dependency
/// degraded the service.
pub async fn health_handler(State(state): State<AppState>) -> Response {
    let storage = check_storage(&state).await;
    let identity = check_configured(state.inner.auth_configured, "identity provider not configured");
    let gemini = check_configured(state.inner.analysis_configured, "gemini API key not configured");
    let elevenlabs =
        check_configured(state.inner.speech_configured, "elevenlabs API key not configured");

    let status = aggregate(&[&storage, &identity, &gemini, &elevenlabs]);

    let report = HealthResponse {
        status,
        timestamp: jiff::Timestamp::now().to_string(),
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.inner.started_at.elapsed().as_secs(),
        services: ServiceReport {
            api: ServiceCheck::healthy(0),
            storage,
            identity,
            gemini,
            elevenlabs,
        },
        environment: state.inner.environment.clone(),
    };

    let code = if status == ServiceStatus::Healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let mut response = (code, Json(report)).into_response();
    response
        .headers_mut()
        .insert(http::header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// Overall status across the checked dependencies
///
/// Healthy only when everything is healthy, down only when everything
/// is down, degraded for any mix.
fn aggregate(checks: &[&ServiceCheck]) -> ServiceStatus {
    if checks.iter().all(|c| c.status == ServiceStatus::Healthy) {
        ServiceStatus::Healthy
    } else if checks.iter().all(|c| c.status == ServiceStatus::Down) {
        ServiceStatus::Down
    } else {
        ServiceStatus::Degraded
    }
}

/// Round-trip the document store and time it
async fn check_storage(state: &AppState) -> ServiceCheck {
    let started = Instant::now();
    let result = state.inner.store.get(USERS, "health_probe").await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match result {
        Ok(_) => ServiceCheck::healthy(latency_ms),
        Err(e) => ServiceCheck::down(latency_ms, e.to_string()),
    }
}

fn check_configured(configured: bool, error: &str) -> ServiceCheck {
    if configured {
        ServiceCheck::healthy(0)
    } else {
        ServiceCheck::down(0, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> ServiceCheck {
        ServiceCheck::healthy(1)
    }

    fn down() -> ServiceCheck {
        ServiceCheck::down(1, "not configured")
    }

    #[test]
    fn all_healthy_is_healthy() {
        assert_eq!(
            aggregate(&[&healthy(), &healthy(), &healthy()]),
            ServiceStatus::Healthy
        );
    }

    #[test]
    fn any_down_among_healthy_is_degraded() {
        assert_eq!(
            aggregate(&[&healthy(), &down(), &healthy()]),
            ServiceStatus::Degraded
        );
    }

    #[test]
    fn everything_down_is_down() {
        assert_eq!(aggregate(&[&down(), &down()]), ServiceStatus::Down);
    }

    #[test]
    fn check_serializes_lowercase_without_null_error() {
        let value = serde_json::to_value(healthy()).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["latencyMs"], 1);
        assert!(value.get("error").is_none());

        let value = serde_json::to_value(down()).unwrap();
        assert_eq!(value["status"], "down");
        assert_eq!(value["error"], "not configured");
    }
}
