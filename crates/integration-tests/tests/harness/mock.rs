//! Mock upstream services
//!
//! Tiny axum apps standing in for the identity provider, ElevenLabs and
//! the Gemini API, each bound to a random local port and shut down when
//! dropped.

use std::net::SocketAddr;

use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use super::config::SERVICE_SECRET;

/// Bearer token the mock identity provider accepts for user `alice`
pub const TOKEN_ALICE: &str = "token-alice";
/// Bearer token the mock identity provider accepts for user `bob`
pub const TOKEN_BOB: &str = "token-bob";

/// Bytes the mock ElevenLabs backend returns for every synthesis
pub const FAKE_MP3: &[u8] = b"ID3\x03\x00mock-mp3-payload";

/// Signed URL the mock agent endpoint hands out
pub const SIGNED_URL: &str = "wss://api.elevenlabs.io/v1/convai/conversation?token=mock";

async fn spawn(app: Router) -> anyhow::Result<(SocketAddr, CancellationToken)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_clone.cancelled().await;
            })
            .await
            .ok();
    });

    Ok((addr, shutdown))
}

// -- Identity provider --

/// Mock identity provider with two known users
pub struct MockIdentity {
    addr: SocketAddr,
    shutdown: CancellationToken,
}

impl MockIdentity {
    pub async fn start() -> anyhow::Result<Self> {
        let app = Router::new().route("/v1/tokens/verify", routing::post(verify_token));
        let (addr, shutdown) = spawn(app).await?;
        Ok(Self { addr, shutdown })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockIdentity {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn verify_token(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if headers
        .get("x-service-secret")
        .and_then(|v| v.to_str().ok())
        != Some(SERVICE_SECRET)
    {
        return (StatusCode::FORBIDDEN, Json(json!({ "error": "bad service secret" }))).into_response();
    }

    let token = body.get("token").and_then(Value::as_str).unwrap_or_default();
    let user = match token {
        TOKEN_ALICE => json!({
            "uid": "alice",
            "email": "alice@example.com",
            "displayName": "Alice",
            "emailVerified": true
        }),
        TOKEN_BOB => json!({
            "uid": "bob",
            "email": "bob@example.com",
            "displayName": "Bob",
            "emailVerified": true
        }),
        _ => return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid token" }))).into_response(),
    };

    (StatusCode::OK, Json(user)).into_response()
}

// -- ElevenLabs --

/// Mock ElevenLabs backend for synthesis and signed URLs
pub struct MockElevenLabs {
    addr: SocketAddr,
    shutdown: CancellationToken,
}

impl MockElevenLabs {
    /// Start a healthy mock
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(false).await
    }

    /// Start a mock whose API key lacks the agent permission
    pub async fn start_missing_permissions() -> anyhow::Result<Self> {
        Self::start_inner(true).await
    }

    async fn start_inner(missing_permissions: bool) -> anyhow::Result<Self> {
        let signed_url_handler = move |headers: HeaderMap| async move {
            if headers.get("xi-api-key").is_none() {
                return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "no key" }))).into_response();
            }
            if missing_permissions {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "detail": {
                            "status": "missing_permissions",
                            "message": "The API key you used is missing the permission convai_write"
                        }
                    })),
                )
                    .into_response();
            }
            (StatusCode::OK, Json(json!({ "signed_url": SIGNED_URL }))).into_response()
        };

        let app = Router::new()
            .route("/text-to-speech/{voice}", routing::post(synthesize))
            .route("/convai/conversation/get-signed-url", routing::get(signed_url_handler));
        let (addr, shutdown) = spawn(app).await?;
        Ok(Self { addr, shutdown })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockElevenLabs {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn synthesize(headers: HeaderMap) -> Response {
    if headers.get("xi-api-key").is_none() {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "no key" }))).into_response();
    }

    ([(header::CONTENT_TYPE, "audio/mpeg")], FAKE_MP3.to_vec()).into_response()
}

// -- Gemini --

/// Sectioned analysis reply the mock Gemini backend always returns
pub const GEMINI_REPLY: &str = "SUMMARY: A calm planning conversation between two colleagues.\n\
    \n\
    KEY POINTS:\n\
    - The deadline was moved without notice\n\
    - Both parties agreed on a weekly check-in\n\
    \n\
    CULTURAL OBSERVATIONS:\n\
    - Speaker B softened requests with indirect phrasing\n\
    \n\
    COMMUNICATION PATTERNS:\n\
    - Turn taking stayed balanced throughout\n\
    \n\
    RECOMMENDATIONS:\n\
    - Leave more room after open questions\n";

/// Mock Google Generative Language API
pub struct MockGemini {
    addr: SocketAddr,
    shutdown: CancellationToken,
}

impl MockGemini {
    pub async fn start() -> anyhow::Result<Self> {
        let app = Router::new().route("/models/{model}", routing::post(generate_content));
        let (addr, shutdown) = spawn(app).await?;
        Ok(Self { addr, shutdown })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockGemini {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn generate_content() -> Json<Value> {
    Json(json!({
        "candidates": [{
            "content": {
                "parts": [{ "text": GEMINI_REPLY }]
            }
        }]
    }))
}
