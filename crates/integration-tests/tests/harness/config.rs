//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use lens_config::{AuthConfig, Config, RateLimitConfig, RequestRateLimit};
use secrecy::SecretString;

/// Shared secret the test identity provider expects
pub const SERVICE_SECRET: &str = "test-secret";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Minimal defaults: memory storage, no auth, no rate limits
    pub fn new() -> Self {
        let mut config = Config::default();
        config.server.listen_address = Some(SocketAddr::from(([127, 0, 0, 1], 0)));
        Self { config }
    }

    /// Verify bearer tokens against a mock identity provider
    pub fn with_auth(mut self, identity_url: &str) -> Self {
        self.config.auth = Some(AuthConfig {
            identity_url: identity_url.parse().expect("identity url"),
            service_secret: SecretString::from(SERVICE_SECRET.to_owned()),
            cache_ttl_seconds: 300,
            cache_capacity: 1_000,
            public_paths: vec!["/api/health".to_owned()],
        });
        self
    }

    /// Cap authenticated requests per user
    pub fn with_user_limit(mut self, requests: u32, window: &str) -> Self {
        let rate_limit = self
            .config
            .server
            .rate_limit
            .get_or_insert_with(RateLimitConfig::default);
        rate_limit.per_user = Some(RequestRateLimit {
            requests,
            window: window.to_owned(),
        });
        self
    }

    /// Cap one named route per user
    pub fn with_route_limit(mut self, route: &str, requests: u32, window: &str) -> Self {
        let rate_limit = self
            .config
            .server
            .rate_limit
            .get_or_insert_with(RateLimitConfig::default);
        rate_limit.routes.insert(
            route.to_owned(),
            RequestRateLimit {
                requests,
                window: window.to_owned(),
            },
        );
        self
    }

    /// Point the ElevenLabs client at a mock backend
    pub fn with_speech(mut self, base_url: &str) -> Self {
        self.config.speech.api_key = Some(SecretString::from("el-test-key".to_owned()));
        self.config.speech.agent_id = Some("agent_test".to_owned());
        self.config.speech.base_url = Some(base_url.parse().expect("speech base url"));
        self
    }

    /// Point the Gemini insight provider at a mock backend
    pub fn with_analysis(mut self, base_url: &str) -> Self {
        self.config.analysis.api_key = Some(SecretString::from("gm-test-key".to_owned()));
        self.config.analysis.base_url = Some(base_url.parse().expect("analysis base url"));
        self
    }

    pub fn build(self) -> Config {
        self.config.validate().expect("test config must validate");
        self.config
    }
}
