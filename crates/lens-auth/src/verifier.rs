use std::sync::Arc;
use std::time::Duration;

use lens_core::VerifiedUser;
use mini_moka::sync::Cache;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use crate::AuthError;

/// Verifies bearer tokens by calling the identity service, with caching
///
/// Cache entries are keyed by token digest so raw tokens never sit in
/// memory beyond the request that carried them.
#[derive(Clone)]
pub struct TokenVerifier {
    http: reqwest::Client,
    identity_url: url::Url,
    service_secret: SecretString,
    cache: Cache<String, Arc<VerifiedUser>>,
}

impl TokenVerifier {
    /// Create a new verifier
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(
        identity_url: url::Url,
        service_secret: SecretString,
        cache_ttl: Duration,
        cache_capacity: u64,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        let cache = Cache::builder()
            .time_to_live(cache_ttl)
            .max_capacity(cache_capacity)
            .build();

        Ok(Self {
            http,
            identity_url,
            service_secret,
            cache,
        })
    }

    /// Verify a bearer token and return the user it belongs to
    ///
    /// Results are cached for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the token is invalid, expired, or the
    /// identity service is unreachable
    pub async fn verify(&self, token: &str) -> Result<Arc<VerifiedUser>, AuthError> {
        let cache_key = sha256_hex(token);

        if let Some(cached) = self.cache.get(&cache_key) {
            return Ok(cached);
        }

        let url = self
            .identity_url
            .join("/v1/tokens/verify")
            .map_err(|e| AuthError::Identity {
                status: 0,
                message: e.to_string(),
            })?;

        let response = self
            .http
            .post(url)
            .header("X-Service-Secret", self.service_secret.expose_secret())
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await?;

        let status = response.status().as_u16();

        if status == 401 || status == 404 {
            return Err(AuthError::InvalidToken);
        }

        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Identity { status, message });
        }

        let user: VerifiedUser = response.json().await.map_err(|e| AuthError::Identity {
            status: 0,
            message: format!("failed to parse response: {e}"),
        })?;

        let user = Arc::new(user);
        self.cache.insert(cache_key, Arc::clone(&user));

        Ok(user)
    }

    /// Remove a cached verification (e.g. after account deletion)
    pub fn invalidate(&self, token: &str) {
        self.cache.invalidate(&sha256_hex(token));
    }
}

/// Compute the SHA-256 hex digest of a string
fn sha256_hex(input: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        hex.push(HEX[usize::from(byte >> 4)] as char);
        hex.push(HEX[usize::from(byte & 0x0f)] as char);
    }
    hex
}
