use std::sync::Arc;
use std::time::Instant;

use insight::AnalysisEngine;
use lens_config::Config;
use lens_ratelimit::RequestLimiter;
use lens_store::{BlobStore, DocumentStore, create_store};
use speech::ElevenLabsClient;

/// Shared state for route handlers
#[derive(Clone)]
pub struct AppState {
    pub(crate) inner: Arc<AppStateInner>,
}

pub(crate) struct AppStateInner {
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) blobs: BlobStore,
    pub(crate) engine: AnalysisEngine,
    pub(crate) speech: ElevenLabsClient,
    pub(crate) limiter: Option<Arc<RequestLimiter>>,
    /// Expiry applied to synthesized debrief audio
    pub(crate) tts_audio_ttl_days: u32,
    pub(crate) started_at: Instant,
    pub(crate) environment: String,
    pub(crate) auth_configured: bool,
    pub(crate) speech_configured: bool,
    pub(crate) analysis_configured: bool,
}

impl AppState {
    pub(crate) fn new(config: &Config, limiter: Option<Arc<RequestLimiter>>) -> Self {
        let store = create_store(&config.storage);

        Self {
            inner: Arc::new(AppStateInner {
                blobs: BlobStore::new(Arc::clone(&store)),
                store,
                engine: AnalysisEngine::new(&config.analysis),
                speech: ElevenLabsClient::new(&config.speech),
                limiter,
                tts_audio_ttl_days: config.speech.audio_ttl_days,
                started_at: Instant::now(),
                environment: std::env::var("LENS_ENV").unwrap_or_else(|_| "development".to_owned()),
                auth_configured: config.auth.is_some(),
                speech_configured: config.speech.api_key.is_some(),
                analysis_configured: config.analysis.api_key.is_some(),
            }),
        }
    }
}
