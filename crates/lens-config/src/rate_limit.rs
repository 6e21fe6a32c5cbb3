use std::collections::HashMap;

use serde::Deserialize;

/// Rate limiting configuration
///
/// All limits use fixed windows counted in process memory. Route
/// overrides apply on top of the per-user limit, keyed by route name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Per-user rate limit (authenticated requests)
    #[serde(default)]
    pub per_user: Option<RequestRateLimit>,
    /// Per-IP rate limit (unauthenticated requests)
    #[serde(default)]
    pub per_ip: Option<RequestRateLimit>,
    /// Per-route overrides, keyed by route name (e.g. "analyze", "tts")
    #[serde(default)]
    pub routes: HashMap<String, RequestRateLimit>,
}

/// Request-based rate limit
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestRateLimit {
    /// Maximum requests per window
    pub requests: u32,
    /// Window duration (e.g. "1m", "1h")
    pub window: String,
}
