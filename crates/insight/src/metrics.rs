//! Deterministic conversation metrics computed from diarized segments

use std::collections::BTreeMap;

use lens_core::{EscalationSample, Metrics, OverlapEvent, Segment, SilenceEvent, Speaker, SpeakerSplit};

/// A cross-speaker start within this many ms of the previous segment's start
/// counts as an interruption rather than a handover.
const INTERRUPTION_WINDOW_MS: u64 = 200;

/// Gaps longer than this between consecutive segments are recorded as silence.
const SILENCE_THRESHOLD_MS: u64 = 1200;

/// Interruptions per minute at which the escalation score saturates at 1.0.
const ESCALATION_SATURATION: f64 = 4.0;

/// Escalation is sampled once per minute of conversation.
const ESCALATION_BUCKET_MS: u64 = 60_000;

const SNIPPET_MAX_CHARS: usize = 80;

/// Compute talk-time, turn, interruption, overlap, silence, and escalation
/// metrics from transcript segments.
///
/// Segments are processed in `start_ms` order regardless of input order.
/// Segments attributed to `unknown` break up turns but accumulate into
/// neither speaker's totals.
pub fn compute_metrics(segments: &[Segment]) -> Metrics {
    let mut ordered: Vec<&Segment> = segments.iter().collect();
    ordered.sort_by_key(|segment| segment.start_ms);

    let mut talk_time_ms = SpeakerSplit::default();
    let mut turn_count = SpeakerSplit::default();
    let mut interruption_count: SpeakerSplit<u32> = SpeakerSplit::default();
    let mut overlap_events = Vec::new();
    let mut silence_events = Vec::new();
    let mut interruption_buckets: BTreeMap<u64, u32> = BTreeMap::new();

    let mut previous_speaker: Option<Speaker> = None;
    for (index, segment) in ordered.iter().enumerate() {
        let length_ms = segment.end_ms.saturating_sub(segment.start_ms);
        if let Some(talk_time) = talk_time_ms.get_mut(segment.speaker) {
            *talk_time += length_ms;
        }

        if previous_speaker != Some(segment.speaker) {
            previous_speaker = Some(segment.speaker);
            if let Some(turns) = turn_count.get_mut(segment.speaker) {
                *turns += 1;
            }
        }

        let Some(previous) = index.checked_sub(1).map(|i| ordered[i]) else {
            continue;
        };

        if previous.speaker != segment.speaker && segment.start_ms < previous.end_ms {
            overlap_events.push(OverlapEvent {
                at_ms: segment.start_ms,
                by: segment.speaker,
                snippet: snippet(&segment.text),
            });

            let since_previous_start = segment.start_ms.saturating_sub(previous.start_ms);
            if since_previous_start < INTERRUPTION_WINDOW_MS
                && let Some(count) = interruption_count.get_mut(segment.speaker)
            {
                *count += 1;
                *interruption_buckets.entry(segment.start_ms / ESCALATION_BUCKET_MS).or_default() += 1;
            }
        } else if segment.start_ms.saturating_sub(previous.end_ms) > SILENCE_THRESHOLD_MS {
            silence_events.push(SilenceEvent {
                start_ms: previous.end_ms,
                end_ms: segment.start_ms,
                after_speaker: previous.speaker,
            });
        }
    }

    let avg_turn_length_ms = SpeakerSplit {
        a: average(talk_time_ms.a, turn_count.a),
        b: average(talk_time_ms.b, turn_count.b),
    };

    let escalation = interruption_buckets
        .into_iter()
        .map(|(bucket, count)| EscalationSample {
            at_ms: bucket * ESCALATION_BUCKET_MS,
            score: (f64::from(count) / ESCALATION_SATURATION).min(1.0),
        })
        .collect();

    Metrics {
        talk_time_ms,
        turn_count,
        avg_turn_length_ms,
        interruption_count,
        overlap_events,
        silence_events,
        escalation,
    }
}

fn average(total_ms: u64, turns: u32) -> u64 {
    if turns == 0 { 0 } else { total_ms / u64::from(turns) }
}

fn snippet(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_owned(),
    }
}
