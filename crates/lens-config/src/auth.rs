use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Identity-provider token verification configuration
///
/// When this section is present, every request outside `public_paths`
/// must carry a bearer token the identity service accepts.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Base URL of the identity service
    pub identity_url: Url,

    /// Shared secret for backend-to-identity calls
    pub service_secret: SecretString,

    /// Cache TTL in seconds for verified tokens
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,

    /// Maximum number of cached verifications
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,

    /// Paths that skip authentication
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

fn default_cache_ttl() -> u64 {
    300
}

fn default_cache_capacity() -> u64 {
    10_000
}

fn default_public_paths() -> Vec<String> {
    vec!["/api/health".to_string()]
}
