//! Analysis pipeline orchestration
//!
//! Metrics and markers are always computed locally; insight generation goes
//! through the configured provider and degrades to the local provider on
//! any failure, so analysis itself never fails.

use lens_config::AnalysisConfig;
use lens_core::{AnalysisResult, Segment};

use crate::debrief::generate_debrief;
use crate::markers::extract_markers;
use crate::metrics::compute_metrics;
use crate::provider::gemini::GeminiProvider;
use crate::provider::local::derive_insights;
use crate::provider::{InsightProvider, InsightRequest};

/// Turns transcripts into analysis results
pub struct AnalysisEngine {
    provider: Option<Box<dyn InsightProvider>>,
}

impl AnalysisEngine {
    /// Create an engine from analysis configuration
    pub fn new(config: &AnalysisConfig) -> Self {
        let provider =
            GeminiProvider::from_config(config).map(|provider| Box::new(provider) as Box<dyn InsightProvider>);
        if provider.is_none() {
            tracing::warn!("analysis API key not configured, insights will use local analysis");
        }
        Self { provider }
    }

    /// Name of the insight backend in use
    pub fn provider_name(&self) -> &str {
        self.provider.as_deref().map_or("local", |provider| provider.name())
    }

    /// Run the full analysis pipeline over a transcript
    pub async fn analyze(&self, segments: Vec<Segment>, cultural_context_tags: &[String]) -> AnalysisResult {
        let metrics = compute_metrics(&segments);
        let markers = extract_markers(&segments);
        let request = InsightRequest {
            segments: &segments,
            metrics: &metrics,
            markers: &markers,
            cultural_context_tags,
        };

        let insights = match &self.provider {
            Some(provider) => match provider.generate(&request).await {
                Ok(insights) => insights,
                Err(error) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %error,
                        "insight provider failed, falling back to local analysis"
                    );
                    derive_insights(&request)
                }
            },
            None => derive_insights(&request),
        };

        let debrief = generate_debrief(&metrics, &insights);
        AnalysisResult {
            segments,
            metrics,
            insights,
            debrief,
        }
    }
}
