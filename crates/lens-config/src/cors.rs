use std::time::Duration;

use serde::Deserialize;

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins (wildcard "*" or explicit list)
    #[serde(default)]
    pub origins: AnyOrArray,
    /// Allowed HTTP methods (wildcard "*" or explicit list)
    #[serde(default)]
    pub methods: AnyOrArray,
    /// Allowed headers (wildcard "*" or explicit list)
    #[serde(default)]
    pub headers: AnyOrArray,
    /// Allow credentials
    #[serde(default)]
    pub credentials: bool,
    /// Max age for preflight cache in seconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

/// Either a wildcard "*" or an explicit list of values
///
/// Accepts a bare string or an array in TOML. A list containing "*"
/// collapses to the wildcard.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnyOrArray {
    Value(String),
    List(Vec<String>),
}

impl Default for AnyOrArray {
    fn default() -> Self {
        Self::Value("*".to_string())
    }
}

impl AnyOrArray {
    /// Returns `None` for the wildcard, otherwise the explicit values
    pub fn explicit(&self) -> Option<Vec<String>> {
        let values = match self {
            Self::Value(value) => std::slice::from_ref(value),
            Self::List(values) => values.as_slice(),
        };
        if values.iter().any(|v| v == "*") {
            None
        } else {
            Some(values.to_vec())
        }
    }
}

impl CorsConfig {
    /// Get max age as Duration
    pub fn max_age_duration(&self) -> Option<Duration> {
        self.max_age.map(Duration::from_secs)
    }
}
