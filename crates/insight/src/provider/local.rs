//! Deterministic local insight provider
//!
//! Used when no analysis API key is configured and as the fallback when the
//! remote provider fails. Works purely from computed metrics and marker
//! matches, so its insights always cite the transcript itself.

use std::collections::HashSet;

use async_trait::async_trait;
use lens_core::{Evidence, Insight, InsightCategory, InsightConfidence, generate_doc_id};

use super::{InsightProvider, InsightRequest, SectionedAnalysis, sections_to_insights};
use crate::error::InsightError;
use crate::markers::{MarkerCategory, count_markers};

/// Talk-time share at which participation reads as one-sided
const IMBALANCE_PERCENT: u64 = 65;

/// Hedging only becomes an insight once it recurs
const HEDGING_MIN: usize = 3;

/// Directive phrasing only becomes an insight once it recurs
const DIRECTIVE_MIN: usize = 2;

const QUOTE_MAX_CHARS: usize = 120;

const MAX_EVIDENCE: usize = 2;

/// Insight provider that needs no external service
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalProvider;

#[async_trait]
impl InsightProvider for LocalProvider {
    fn name(&self) -> &str {
        "local"
    }

    async fn generate(&self, request: &InsightRequest<'_>) -> Result<Vec<Insight>, InsightError> {
        Ok(derive_insights(request))
    }
}

/// Build insights from metrics and markers alone
pub fn derive_insights(request: &InsightRequest<'_>) -> Vec<Insight> {
    let mut insights = Vec::new();

    push_talk_balance(request, &mut insights);
    push_overlaps(request, &mut insights);
    push_silences(request, &mut insights);
    push_marker_insights(request, &mut insights);

    if insights.is_empty() {
        insights = baseline(request);
    }
    insights
}

fn push_talk_balance(request: &InsightRequest<'_>, insights: &mut Vec<Insight>) {
    let metrics = request.metrics;
    let total_ms = metrics.talk_time_ms.a + metrics.talk_time_ms.b;
    if total_ms == 0 {
        return;
    }

    let share_a = metrics.talk_time_ms.a * 100 / total_ms;
    let share_b = 100 - share_a;
    let (leader, leading_share) = if share_a >= share_b { ("A", share_a) } else { ("B", share_b) };

    let item = if leading_share >= IMBALANCE_PERCENT {
        let mut item = base_insight(
            InsightCategory::TurnTaking,
            "Talk time leaned one way",
            format!("Speaker {leader} held about {leading_share} percent of the talk time."),
            InsightConfidence::High,
            "computed from segment timestamps",
        );
        item.hypothesis = Some(
            "In some communication styles, holding the floor signals engagement; in others it \
             crowds out quieter voices."
                .to_owned(),
        );
        item
    } else {
        let turns = metrics.turn_count.a + metrics.turn_count.b;
        base_insight(
            InsightCategory::TurnTaking,
            "Participation stayed balanced",
            format!("Talk time split about {share_a} to {share_b} percent across {turns} turns."),
            InsightConfidence::High,
            "computed from segment timestamps",
        )
    };
    insights.push(item);
}

fn push_overlaps(request: &InsightRequest<'_>, insights: &mut Vec<Insight>) {
    let metrics = request.metrics;
    if metrics.overlap_events.is_empty() {
        return;
    }

    let interruptions = metrics.interruption_count.a + metrics.interruption_count.b;
    let summary = if interruptions == 0 {
        format!(
            "{} times one speaker began while the other was still talking.",
            metrics.overlap_events.len(),
        )
    } else {
        format!(
            "{} times one speaker began while the other was still talking, {interruptions} of \
             them within moments of the previous turn starting.",
            metrics.overlap_events.len(),
        )
    };

    let mut item = base_insight(
        InsightCategory::TurnTaking,
        "Overlapping starts",
        summary,
        InsightConfidence::Medium,
        "overlapping segment timestamps",
    );
    item.hypothesis = Some(
        "In some communication styles, overlapping speech signals engagement rather than \
         disrespect."
            .to_owned(),
    );
    item.evidence = metrics
        .overlap_events
        .iter()
        .take(MAX_EVIDENCE)
        .map(|event| Evidence {
            start_ms: event.at_ms,
            end_ms: event.at_ms,
            quote: event.snippet.clone(),
        })
        .collect();
    insights.push(item);
}

fn push_silences(request: &InsightRequest<'_>, insights: &mut Vec<Insight>) {
    let silences = &request.metrics.silence_events;
    if silences.is_empty() {
        return;
    }

    let mut item = base_insight(
        InsightCategory::CulturalLens,
        "Notable pauses",
        format!("The conversation paused noticeably {} times between turns.", silences.len()),
        InsightConfidence::Medium,
        "gaps between consecutive segments",
    );
    item.hypothesis =
        Some("In some communication styles, a pause signals reflection rather than disengagement.".to_owned());
    insights.push(item);
}

fn push_marker_insights(request: &InsightRequest<'_>, insights: &mut Vec<Insight>) {
    let blame = count_markers(request.markers, MarkerCategory::Blame);
    if blame > 0 {
        let mut item = base_insight(
            InsightCategory::Directness,
            "Direct blame language appeared",
            phrase_summary(request, MarkerCategory::Blame, blame),
            InsightConfidence::Medium,
            "matched blame phrases in the transcript",
        );
        item.evidence = marker_evidence(request, MarkerCategory::Blame);
        item.safety_note =
            Some("This is about phrasing patterns, not about either person's character.".to_owned());
        insights.push(item);
    }

    let repair = count_markers(request.markers, MarkerCategory::Repair);
    if repair > 0 {
        let mut item = base_insight(
            InsightCategory::Repair,
            "Repair attempts were made",
            phrase_summary(request, MarkerCategory::Repair, repair),
            InsightConfidence::High,
            "matched repair phrases in the transcript",
        );
        item.evidence = marker_evidence(request, MarkerCategory::Repair);
        insights.push(item);
    }

    let validation = count_markers(request.markers, MarkerCategory::Validation);
    if validation > 0 {
        let mut item = base_insight(
            InsightCategory::Repair,
            "Moments of acknowledgment",
            phrase_summary(request, MarkerCategory::Validation, validation),
            InsightConfidence::Medium,
            "matched validation phrases in the transcript",
        );
        item.evidence = marker_evidence(request, MarkerCategory::Validation);
        insights.push(item);
    }

    let hedging = count_markers(request.markers, MarkerCategory::Hedging);
    if hedging >= HEDGING_MIN {
        let mut item = base_insight(
            InsightCategory::Directness,
            "Softened phrasing was frequent",
            phrase_summary(request, MarkerCategory::Hedging, hedging),
            InsightConfidence::Medium,
            "matched hedging phrases in the transcript",
        );
        item.hypothesis = Some(
            "In some communication styles, hedging preserves harmony rather than signaling \
             uncertainty."
                .to_owned(),
        );
        item.evidence = marker_evidence(request, MarkerCategory::Hedging);
        insights.push(item);
    }

    let directives = count_markers(request.markers, MarkerCategory::Directive);
    if directives >= DIRECTIVE_MIN {
        let mut item = base_insight(
            InsightCategory::Directness,
            "Imperative phrasing recurred",
            phrase_summary(request, MarkerCategory::Directive, directives),
            InsightConfidence::Medium,
            "matched directive phrases in the transcript",
        );
        item.hypothesis = Some(
            "In some communication styles, direct instructions read as efficient rather than \
             harsh."
                .to_owned(),
        );
        item.evidence = marker_evidence(request, MarkerCategory::Directive);
        insights.push(item);
    }
}

fn base_insight(
    category: InsightCategory,
    title: &str,
    summary: String,
    confidence: InsightConfidence,
    why: &str,
) -> Insight {
    Insight {
        id: generate_doc_id("insight"),
        category,
        title: title.to_owned(),
        summary,
        hypothesis: None,
        confidence,
        evidence: Vec::new(),
        why_this_was_flagged: why.to_owned(),
        safety_note: None,
    }
}

fn phrase_summary(request: &InsightRequest<'_>, category: MarkerCategory, count: usize) -> String {
    let example = request
        .markers
        .iter()
        .find(|marker| marker.category == category)
        .map_or("", |marker| marker.phrase.as_str());
    let times = if count == 1 { "time" } else { "times" };
    format!("Phrases like \"{example}\" appeared {count} {times}.")
}

/// Evidence quotes for a marker category, one per distinct segment
fn marker_evidence(request: &InsightRequest<'_>, category: MarkerCategory) -> Vec<Evidence> {
    let mut cited: HashSet<usize> = HashSet::new();
    request
        .markers
        .iter()
        .filter(|marker| marker.category == category)
        .filter(|marker| cited.insert(marker.segment_index))
        .filter_map(|marker| request.segments.get(marker.segment_index))
        .map(|segment| Evidence {
            start_ms: segment.start_ms,
            end_ms: segment.end_ms,
            quote: quote_of(&segment.text),
        })
        .take(MAX_EVIDENCE)
        .collect()
}

fn quote_of(text: &str) -> String {
    match text.char_indices().nth(QUOTE_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_owned(),
    }
}

/// Static analysis used when the transcript carries no usable signal
fn baseline(request: &InsightRequest<'_>) -> Vec<Insight> {
    let speakers: HashSet<_> = request.segments.iter().map(|segment| segment.speaker).collect();
    let words: usize = request
        .segments
        .iter()
        .map(|segment| segment.text.split_whitespace().count())
        .sum();

    let analysis = SectionedAnalysis {
        summary: format!(
            "Conversation between {} participants spanning approximately {words} words.",
            speakers.len(),
        ),
        key_points: vec![
            "Turn-taking patterns identified".to_owned(),
            "Communication styles observed".to_owned(),
            "Key discussion topics noted".to_owned(),
        ],
        cultural_observations: vec![
            "Formality level: moderate".to_owned(),
            "Communication style: collaborative".to_owned(),
            "Power dynamics: balanced".to_owned(),
        ],
        communication_patterns: vec![
            "Active listening demonstrated".to_owned(),
            "Clear articulation of points".to_owned(),
            "Respectful turn-taking".to_owned(),
        ],
        recommendations: vec![
            "Continue current communication approach".to_owned(),
            "Maintain balanced participation".to_owned(),
            "Foster open dialogue".to_owned(),
        ],
    };
    sections_to_insights(&analysis)
}
