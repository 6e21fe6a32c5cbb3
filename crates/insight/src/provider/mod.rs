//! Insight provider trait and implementations

pub mod gemini;
pub mod local;

use async_trait::async_trait;
use lens_core::{Insight, InsightCategory, InsightConfidence, Metrics, Segment, generate_doc_id};

use crate::error::InsightError;
use crate::markers::LinguisticMarker;

/// Everything a provider may draw on when generating insights
#[derive(Debug, Clone, Copy)]
pub struct InsightRequest<'a> {
    pub segments: &'a [Segment],
    pub metrics: &'a Metrics,
    pub markers: &'a [LinguisticMarker],
    /// Cultural context tags from the session settings
    pub cultural_context_tags: &'a [String],
}

/// Trait implemented by each insight backend
#[async_trait]
pub trait InsightProvider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Generate insights for one conversation
    async fn generate(&self, request: &InsightRequest<'_>) -> Result<Vec<Insight>, InsightError>;
}

/// Analysis text broken into the five prompt sections
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct SectionedAnalysis {
    pub summary: String,
    pub key_points: Vec<String>,
    pub cultural_observations: Vec<String>,
    pub communication_patterns: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Map sectioned analysis text onto insight cards
///
/// Provider prose carries no timestamps, so these insights have no evidence
/// quotes attached.
pub(crate) fn sections_to_insights(analysis: &SectionedAnalysis) -> Vec<Insight> {
    let mut insights = Vec::new();

    if !analysis.summary.is_empty() {
        insights.push(prose_insight(
            InsightCategory::CulturalLens,
            "Conversation overview".to_owned(),
            analysis.summary.clone(),
            None,
            "generated from the full transcript",
        ));
    }

    for point in &analysis.key_points {
        insights.push(prose_insight(
            InsightCategory::Assumptions,
            title_of(point),
            point.clone(),
            None,
            "identified as a main discussion point",
        ));
    }

    for observation in &analysis.cultural_observations {
        insights.push(prose_insight(
            InsightCategory::CulturalLens,
            title_of(observation),
            observation.clone(),
            Some(observation.clone()),
            "observed communication-style difference",
        ));
    }

    for pattern in &analysis.communication_patterns {
        insights.push(prose_insight(
            InsightCategory::TurnTaking,
            title_of(pattern),
            pattern.clone(),
            None,
            "recurring pattern across the transcript",
        ));
    }

    for recommendation in &analysis.recommendations {
        insights.push(prose_insight(
            InsightCategory::Repair,
            title_of(recommendation),
            recommendation.clone(),
            None,
            "suggested follow-up based on the observed patterns",
        ));
    }

    insights
}

fn prose_insight(
    category: InsightCategory,
    title: String,
    summary: String,
    hypothesis: Option<String>,
    why: &str,
) -> Insight {
    Insight {
        id: generate_doc_id("insight"),
        category,
        title,
        summary,
        hypothesis,
        confidence: InsightConfidence::Medium,
        evidence: Vec::new(),
        why_this_was_flagged: why.to_owned(),
        safety_note: None,
    }
}

const TITLE_MAX_CHARS: usize = 60;

fn title_of(text: &str) -> String {
    match text.char_indices().nth(TITLE_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_owned(),
    }
}
