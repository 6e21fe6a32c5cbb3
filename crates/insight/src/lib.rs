//! Conversation analysis crate for `CultureLens`
//!
//! Turns a diarized transcript into quantitative metrics, linguistic marker
//! hits, culturally-framed insights, and a spoken-debrief script. Insights
//! come from the Google Generative Language API when an API key is
//! configured, with a deterministic local fallback otherwise.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod debrief;
pub mod engine;
pub mod error;
pub mod markers;
pub mod metrics;
pub mod provider;

pub use debrief::generate_debrief;
pub use engine::AnalysisEngine;
pub use error::InsightError;
pub use markers::{LinguisticMarker, MarkerCategory, extract_markers};
pub use metrics::compute_metrics;
pub use provider::{InsightProvider, InsightRequest};
