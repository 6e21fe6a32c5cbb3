#![allow(clippy::must_use_candidate)]

//! Shared domain types for the CultureLens backend
//!
//! Defines the data contracts used across the analysis pipeline and the
//! HTTP surface, plus the verified-identity context injected by the
//! server's auth middleware.

mod context;
mod ids;
mod model;

pub mod collections;

pub use context::{Plan, Role, VerifiedUser};
pub use ids::{generate_doc_id, user_doc_id};
pub use model::{
    AnalysisDepth, AnalysisResult, Consent, Debrief, DebriefSection, EscalationSample, Evidence,
    Insight, InsightCategory, InsightConfidence, Metrics, OverlapEvent, Segment, Session,
    SessionSettings, SessionStatus, SilenceEvent, Speaker, SpeakerSplit, StorageMode,
};
