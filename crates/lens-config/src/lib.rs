#![allow(clippy::must_use_candidate)]

//! Configuration for the CultureLens backend
//!
//! Loaded from a TOML file with `{{ env.VAR }}` placeholder expansion,
//! then validated before the server starts.

pub mod analysis;
pub mod auth;
pub mod cors;
mod env;
pub mod health;
mod loader;
pub mod log;
pub mod rate_limit;
pub mod server;
pub mod speech;
pub mod storage;

use serde::Deserialize;

pub use analysis::AnalysisConfig;
pub use auth::AuthConfig;
pub use cors::{AnyOrArray, CorsConfig};
pub use health::HealthConfig;
pub use log::{LogConfig, LogFormat};
pub use rate_limit::{RateLimitConfig, RequestRateLimit};
pub use server::ServerConfig;
pub use speech::SpeechConfig;
pub use storage::{StorageBackend, StorageConfig};

/// Top-level configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Identity-provider token verification; `None` runs the API open
    /// (only sensible for local development and tests)
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    /// Document storage backend
    #[serde(default)]
    pub storage: StorageConfig,
    /// ElevenLabs voice synthesis and conversational agent
    #[serde(default)]
    pub speech: SpeechConfig,
    /// Gemini transcript analysis
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Log filtering and output format
    #[serde(default)]
    pub log: LogConfig,
}
