//! Spoken debrief script generation
//!
//! Produces a template-driven script of roughly eighty seconds: safety
//! framing, a neutral recap of the metrics, the strongest insights, one or
//! two cultural hypotheses, and a closing question. Section boundaries are
//! tracked as character offsets so clients can highlight along with the
//! narration.

use std::fmt::Write;

use lens_core::{Debrief, DebriefSection, Insight, Metrics};

/// Speaking pace used to estimate narration length, around 150 words a
/// minute.
const MS_PER_WORD: u64 = 400;

/// How many insights the key-patterns section narrates
const MAX_KEY_PATTERNS: usize = 3;

/// How many hypotheses the cultural section narrates
const MAX_HYPOTHESES: usize = 2;

/// Build the debrief script from computed metrics and insights
///
/// `audio_url` stays unset; narration audio is synthesized separately and
/// attached afterwards. `duration_ms` is an estimate from word count.
pub fn generate_debrief(metrics: &Metrics, insights: &[Insight]) -> Debrief {
    let mut script = ScriptBuilder::default();

    script.push_section(
        "Safety framing",
        "This is a reflection tool, not therapy or advice.",
    );
    script.push_section("Neutral recap", &recap(metrics));
    script.push_section("Key patterns", &key_patterns(insights));
    script.push_section("Cultural hypotheses", &hypotheses(insights));
    script.push_section("Close", "Would you like to revisit specific moments?");

    let words = script.text.split_whitespace().count() as u64;
    Debrief {
        text: script.text,
        audio_url: None,
        duration_ms: Some(words * MS_PER_WORD),
        sections: script.sections,
    }
}

/// Accumulates section bodies separated by blank lines, tracking character
/// offsets as it goes.
#[derive(Default)]
struct ScriptBuilder {
    text: String,
    chars: usize,
    sections: Vec<DebriefSection>,
}

impl ScriptBuilder {
    fn push_section(&mut self, title: &str, body: &str) {
        if !self.text.is_empty() {
            self.text.push_str("\n\n");
            self.chars += 2;
        }
        let start_char = self.chars;
        self.text.push_str(body);
        self.chars += body.chars().count();
        self.sections.push(DebriefSection {
            title: title.to_owned(),
            start_char,
            end_char: self.chars,
        });
    }
}

fn recap(metrics: &Metrics) -> String {
    let total_ms = metrics.talk_time_ms.a + metrics.talk_time_ms.b;
    if total_ms == 0 {
        return "The recording contained no attributable speech.".to_owned();
    }

    let share_a = percent(metrics.talk_time_ms.a, total_ms);
    let share_b = percent(metrics.talk_time_ms.b, total_ms);
    let mut recap = format!(
        "Speaker A spoke for about {share_a} percent of the conversation across {} turns, \
         and speaker B for about {share_b} percent across {} turns.",
        metrics.turn_count.a, metrics.turn_count.b,
    );

    if !metrics.overlap_events.is_empty() {
        let _ = write!(recap, " Speech overlapped {} times.", metrics.overlap_events.len());
    }
    if !metrics.silence_events.is_empty() {
        let _ = write!(recap, " There were {} longer pauses.", metrics.silence_events.len());
    }
    recap
}

fn key_patterns(insights: &[Insight]) -> String {
    let mut ranked: Vec<&Insight> = insights.iter().collect();
    ranked.sort_by(|x, y| y.confidence.cmp(&x.confidence));

    if ranked.is_empty() {
        return "No single pattern stood out in this conversation.".to_owned();
    }

    let mut body = String::new();
    for insight in ranked.iter().take(MAX_KEY_PATTERNS) {
        if !body.is_empty() {
            body.push(' ');
        }
        let _ = write!(body, "{}. {}", insight.title, insight.summary);
        if let Some(evidence) = insight.evidence.first() {
            let _ = write!(body, " One moment that stood out: \"{}\".", evidence.quote);
        }
    }
    body
}

fn hypotheses(insights: &[Insight]) -> String {
    let listed: Vec<&str> = insights
        .iter()
        .filter_map(|insight| insight.hypothesis.as_deref())
        .take(MAX_HYPOTHESES)
        .collect();

    if listed.is_empty() {
        "In some communication styles, overlapping speech signals engagement; in others it \
         reads as pressure. Neither reading is wrong."
            .to_owned()
    } else {
        listed.join(" ")
    }
}

fn percent(part_ms: u64, total_ms: u64) -> u64 {
    (part_ms * 100 + total_ms / 2) / total_ms
}
