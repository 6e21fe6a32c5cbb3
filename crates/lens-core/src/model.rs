use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A consent-gated recording session
///
/// The unit of work for the whole pipeline: audio is uploaded against a
/// session, transcripts and analysis results attach to it, and every
/// access is scoped to the owning user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    /// Auth uid of the owner, checked on every access
    pub user_id: String,
    pub consent: Consent,
    pub settings: SessionSettings,
    pub status: SessionStatus,
    #[serde(default)]
    pub is_favorite: bool,
    /// Recording length in seconds, set once upload completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Stored audio document id, servable via the audio endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Recording consent from both parties
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
    pub person_a: bool,
    pub person_b: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

/// Per-session recording and analysis preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    pub storage_mode: StorageMode,
    pub voice_id: String,
    pub analysis_depth: AnalysisDepth,
    pub cultural_context_tags: Vec<String>,
    /// 0 (blunt) to 100 (maximally softened) phrasing in debriefs
    pub sensitivity_level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StorageMode {
    /// Audio is discarded after analysis
    Ephemeral,
    /// Only the transcript is retained
    TranscriptOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisDepth {
    Quick,
    Standard,
    Deep,
}

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Recording,
    Uploading,
    Processing,
    Ready,
    Failed,
}

/// A transcribed slice of conversation with speaker attribution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start_ms: u64,
    pub end_ms: u64,
    pub speaker: Speaker,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    A,
    B,
    #[serde(rename = "unknown")]
    Unknown,
}

/// Deterministic communication metrics computed from segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub talk_time_ms: SpeakerSplit<u64>,
    pub turn_count: SpeakerSplit<u32>,
    pub avg_turn_length_ms: SpeakerSplit<u64>,
    pub interruption_count: SpeakerSplit<u32>,
    pub overlap_events: Vec<OverlapEvent>,
    pub silence_events: Vec<SilenceEvent>,
    pub escalation: Vec<EscalationSample>,
}

/// A value tracked separately for each labelled speaker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerSplit<T> {
    #[serde(rename = "A")]
    pub a: T,
    #[serde(rename = "B")]
    pub b: T,
}

impl<T> SpeakerSplit<T> {
    /// Mutable access to the slot for `speaker`; `unknown` maps to none
    pub fn get_mut(&mut self, speaker: Speaker) -> Option<&mut T> {
        match speaker {
            Speaker::A => Some(&mut self.a),
            Speaker::B => Some(&mut self.b),
            Speaker::Unknown => None,
        }
    }
}

/// One speaker starting while the other is still talking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapEvent {
    pub at_ms: u64,
    pub by: Speaker,
    pub snippet: String,
}

/// A gap in conversation longer than the silence threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SilenceEvent {
    pub start_ms: u64,
    pub end_ms: u64,
    pub after_speaker: Speaker,
}

/// Escalation intensity at a point in time, 0.0 to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationSample {
    pub at_ms: u64,
    pub score: f64,
}

/// A single observation about the conversation
///
/// Insights never assign blame; hypotheses use "in some communication
/// styles" framing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    pub category: InsightCategory,
    pub title: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypothesis: Option<String>,
    pub confidence: InsightConfidence,
    pub evidence: Vec<Evidence>,
    pub why_this_was_flagged: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InsightCategory {
    TurnTaking,
    Emotion,
    Directness,
    Repair,
    Assumptions,
    CulturalLens,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightConfidence {
    Low,
    Medium,
    High,
}

/// A quoted excerpt backing an insight
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub start_ms: u64,
    pub end_ms: u64,
    pub quote: String,
}

/// Narrated post-conversation debrief
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debrief {
    pub text: String,
    /// Set once the script has been synthesized and stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub sections: Vec<DebriefSection>,
}

/// Character range of one debrief section within the script text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebriefSection {
    pub title: String,
    pub start_char: usize,
    pub end_char: usize,
}

/// Output of the full analysis pipeline, embedded in the session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub segments: Vec<Segment>,
    pub metrics: Metrics,
    pub insights: Vec<Insight>,
    pub debrief: Debrief,
}
