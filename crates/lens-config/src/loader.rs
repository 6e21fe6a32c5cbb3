use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded = crate::env::expand_env(&raw)
            .map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self =
            toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if rate limit windows do not parse, auth settings
    /// are incomplete, or the health endpoint path is malformed
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_rate_limits()?;
        self.validate_auth_config()?;
        self.validate_health_config()?;
        self.validate_speech_config()?;
        Ok(())
    }

    /// Every configured rate limit window must parse to a non-zero duration
    fn validate_rate_limits(&self) -> anyhow::Result<()> {
        let Some(ref rate_limits) = self.server.rate_limit else {
            return Ok(());
        };

        let mut scopes: Vec<(String, &crate::RequestRateLimit)> = Vec::new();
        if let Some(ref per_user) = rate_limits.per_user {
            scopes.push(("per_user".to_owned(), per_user));
        }
        if let Some(ref per_ip) = rate_limits.per_ip {
            scopes.push(("per_ip".to_owned(), per_ip));
        }
        for (name, limit) in &rate_limits.routes {
            scopes.push((format!("routes.{name}"), limit));
        }

        for (scope, limit) in scopes {
            if limit.requests == 0 {
                anyhow::bail!("rate limit '{scope}' must allow at least one request per window");
            }
            let window = duration_str::parse(&limit.window)
                .map_err(|e| anyhow::anyhow!("invalid window for rate limit '{scope}': {e}"))?;
            if window.is_zero() {
                anyhow::bail!("rate limit '{scope}' window must be greater than zero");
            }
        }

        Ok(())
    }

    /// Validate auth configuration when auth is configured
    fn validate_auth_config(&self) -> anyhow::Result<()> {
        let Some(ref auth) = self.auth else {
            return Ok(());
        };

        if auth.service_secret.expose_secret().is_empty() {
            anyhow::bail!("auth.service_secret must not be empty when auth is configured");
        }

        if auth.cache_ttl_seconds == 0 {
            anyhow::bail!("auth.cache_ttl_seconds must be greater than 0");
        }

        if auth.cache_capacity > 1_000_000 {
            anyhow::bail!("auth.cache_capacity exceeds maximum of 1,000,000");
        }

        for path in &auth.public_paths {
            if !path.starts_with('/') {
                anyhow::bail!("auth.public_paths entry '{path}' must start with '/'");
            }
        }

        Ok(())
    }

    fn validate_health_config(&self) -> anyhow::Result<()> {
        if !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }
        Ok(())
    }

    /// Audio retention of zero days would expire blobs at write time
    fn validate_speech_config(&self) -> anyhow::Result<()> {
        if self.speech.audio_ttl_days == 0 {
            anyhow::bail!("speech.audio_ttl_days must be greater than 0");
        }
        Ok(())
    }
}
