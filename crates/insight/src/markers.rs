//! Linguistic marker extraction over transcript text
//!
//! Markers are surface-level phrase matches. They feed the insight provider
//! prompt and the local fallback; on their own they are signals, not
//! conclusions.

use std::sync::OnceLock;

use lens_core::Segment;
use regex::Regex;

/// Phrase families scanned for in each segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerCategory {
    /// Softening qualifiers ("maybe", "I guess")
    Hedging,
    /// Accusatory framing ("you always", "it's your fault")
    Blame,
    /// Attempts to restate or defuse ("let me rephrase")
    Repair,
    /// Acknowledgment of the other party ("I hear you")
    Validation,
    /// Deflection that preserves composure ("it's fine", "whatever")
    FaceSaving,
    /// Imperative phrasing ("you need to", "stop")
    Directive,
}

impl MarkerCategory {
    /// Lowercase label used in prompts and logs
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hedging => "hedging",
            Self::Blame => "blame",
            Self::Repair => "repair",
            Self::Validation => "validation",
            Self::FaceSaving => "face-saving",
            Self::Directive => "directive",
        }
    }
}

/// One phrase match inside one segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinguisticMarker {
    pub category: MarkerCategory,
    /// Index into the segment slice the marker was found in
    pub segment_index: usize,
    /// The matched phrase, as written in the transcript
    pub phrase: String,
}

const PATTERNS: &[(MarkerCategory, &str)] = &[
    (
        MarkerCategory::Hedging,
        r"(?i)\b(?:maybe|kind of|i guess|sort of|probably|might)\b",
    ),
    (
        MarkerCategory::Blame,
        r"(?i)\b(?:you always|you never|it's your fault|because of you)\b",
    ),
    (
        MarkerCategory::Repair,
        r"(?i)\b(?:that's not what i meant|let me rephrase|i'm trying to say)\b",
    ),
    (
        MarkerCategory::Validation,
        r"(?i)\b(?:i hear you|that makes sense|i understand|you're right)\b",
    ),
    (
        MarkerCategory::FaceSaving,
        r"(?i)\b(?:it's fine|don't worry|no problem|whatever)\b",
    ),
    (
        MarkerCategory::Directive,
        r"(?i)\b(?:you need to|you should|you have to|stop)\b",
    ),
];

fn compiled_patterns() -> &'static [(MarkerCategory, Regex)] {
    static COMPILED: OnceLock<Vec<(MarkerCategory, Regex)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        PATTERNS
            .iter()
            .map(|(category, pattern)| (*category, Regex::new(pattern).expect("must be valid regex")))
            .collect()
    })
}

/// Scan every segment for marker phrases, in segment order
pub fn extract_markers(segments: &[Segment]) -> Vec<LinguisticMarker> {
    let mut markers = Vec::new();
    for (segment_index, segment) in segments.iter().enumerate() {
        for (category, regex) in compiled_patterns() {
            for found in regex.find_iter(&segment.text) {
                markers.push(LinguisticMarker {
                    category: *category,
                    segment_index,
                    phrase: found.as_str().to_owned(),
                });
            }
        }
    }
    markers
}

/// Count markers in `category`
pub fn count_markers(markers: &[LinguisticMarker], category: MarkerCategory) -> usize {
    markers.iter().filter(|marker| marker.category == category).count()
}

#[cfg(test)]
mod tests {
    use lens_core::Speaker;

    use super::*;

    fn segment(text: &str) -> Segment {
        Segment {
            start_ms: 0,
            end_ms: 1_000,
            speaker: Speaker::A,
            text: text.to_owned(),
            confidence: None,
        }
    }

    #[test]
    fn finds_markers_case_insensitively() {
        let segments = vec![segment("Maybe you ALWAYS do this, I guess")];

        let markers = extract_markers(&segments);

        assert_eq!(count_markers(&markers, MarkerCategory::Hedging), 2);
        assert_eq!(count_markers(&markers, MarkerCategory::Blame), 1);
        let blame = markers
            .iter()
            .find(|m| m.category == MarkerCategory::Blame)
            .unwrap();
        assert_eq!(blame.phrase, "you ALWAYS");
        assert_eq!(blame.segment_index, 0);
    }

    #[test]
    fn matches_phrases_with_apostrophes() {
        let segments = vec![
            segment("it's your fault we missed it"),
            segment("that's not what I meant at all"),
        ];

        let markers = extract_markers(&segments);

        assert_eq!(count_markers(&markers, MarkerCategory::Blame), 1);
        assert_eq!(count_markers(&markers, MarkerCategory::Repair), 1);
        assert_eq!(markers[1].segment_index, 1);
    }

    #[test]
    fn respects_word_boundaries() {
        // "mightier" must not register as "might", "stopped" not as "stop".
        let segments = vec![segment("the mightier pen never stopped writing")];

        assert!(extract_markers(&segments).is_empty());
    }

    #[test]
    fn one_segment_can_hold_markers_from_many_categories() {
        let segments = vec![segment("I hear you, but you need to stop, it's fine really")];

        let markers = extract_markers(&segments);

        assert_eq!(count_markers(&markers, MarkerCategory::Validation), 1);
        assert_eq!(count_markers(&markers, MarkerCategory::Directive), 2);
        assert_eq!(count_markers(&markers, MarkerCategory::FaceSaving), 1);
    }
}
