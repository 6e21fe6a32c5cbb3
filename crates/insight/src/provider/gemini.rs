//! Google Generative Language API insight provider
//!
//! Sends the transcript with an analysis prompt to `generateContent` and
//! parses the sectioned plain-text reply. The prompt pins an exact section
//! format; the parser still strips any markdown the model sneaks in.

use std::collections::HashSet;
use std::sync::OnceLock;

use async_trait::async_trait;
use lens_config::AnalysisConfig;
use lens_core::{Insight, Speaker};
use regex::Regex;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{InsightProvider, InsightRequest, SectionedAnalysis, sections_to_insights};
use crate::error::InsightError;

/// Default Google Generative Language API base URL
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Insight provider backed by the Gemini `generateContent` endpoint
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl GeminiProvider {
    /// Create from analysis configuration; none without an API key
    pub fn from_config(config: &AnalysisConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        let base_url = config.base_url.as_ref().map_or_else(
            || DEFAULT_BASE_URL.to_owned(),
            |url| url.as_str().trim_end_matches('/').to_owned(),
        );

        Some(Self {
            client: Client::new(),
            base_url,
            api_key,
            model: config.model.clone(),
        })
    }

    /// Build the `generateContent` endpoint URL
    fn generate_url(&self, api_key: &str) -> String {
        format!("{}/models/{}:generateContent?key={api_key}", self.base_url, self.model)
    }
}

#[async_trait]
impl InsightProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &InsightRequest<'_>) -> Result<Vec<Insight>, InsightError> {
        let prompt = build_prompt(request);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        tracing::debug!(model = %self.model, "requesting transcript analysis");
        let response = self
            .client
            .post(self.generate_url(self.api_key.expose_secret()))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(status, &body));
        }

        let reply: GenerateResponse = response.json().await?;
        let text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().map(|part| part.text).collect::<String>())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(InsightError::Malformed("response contained no analysis text".to_owned()));
        }

        let analysis = parse_sections(&text);
        if analysis == SectionedAnalysis::default() {
            return Err(InsightError::Malformed(
                "response did not follow the section format".to_owned(),
            ));
        }

        let insights = sections_to_insights(&analysis);
        tracing::debug!(count = insights.len(), "transcript analysis complete");
        Ok(insights)
    }
}

// -- Wire types --

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

fn classify_error(status: StatusCode, body: &str) -> InsightError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .and_then(|error| error.message)
        .unwrap_or_else(|| format!("status {status}: {body}"));

    InsightError::Api {
        status: status.as_u16(),
        message,
    }
}

// -- Prompt --

fn build_prompt(request: &InsightRequest<'_>) -> String {
    let speakers: HashSet<Speaker> = request.segments.iter().map(|segment| segment.speaker).collect();
    let speaker_count = if speakers.is_empty() { 2 } else { speakers.len() };

    let duration = if request.segments.is_empty() {
        "0".to_owned()
    } else {
        let end_ms = request.segments.iter().map(|segment| segment.end_ms).max().unwrap_or(0);
        format!("{}.{}", end_ms / 1_000, (end_ms % 1_000) / 100)
    };

    let context = if request.cultural_context_tags.is_empty() {
        "Workplace conversation for conflict resolution".to_owned()
    } else {
        request.cultural_context_tags.join(", ")
    };

    let transcript = request
        .segments
        .iter()
        .map(|segment| format!("Speaker {}: {}", speaker_label(segment.speaker), segment.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a cultural communication expert analyzing a conversation transcript.\n\
         \n\
         CONVERSATION METADATA:\n\
         - Duration: {duration} seconds\n\
         - Participants: {speaker_count} speakers\n\
         - Context: {context}\n\
         \n\
         TRANSCRIPT:\n\
         {transcript}\n\
         \n\
         ANALYSIS REQUIREMENTS:\n\
         Provide a structured analysis in PLAIN TEXT format (NO markdown, NO asterisks, NO bold/italic formatting).\n\
         \n\
         Use this EXACT format:\n\
         \n\
         SUMMARY: Write 2-3 sentences describing the conversation's overall tone and purpose.\n\
         \n\
         KEY POINTS:\n\
         - First main discussion point\n\
         - Second main discussion point\n\
         - Third main discussion point\n\
         - Fourth main discussion point\n\
         - Fifth main discussion point\n\
         \n\
         CULTURAL OBSERVATIONS:\n\
         - First cultural insight about communication styles\n\
         - Second cultural insight\n\
         - Third cultural insight\n\
         \n\
         COMMUNICATION PATTERNS:\n\
         - First pattern identified with evidence\n\
         - Second pattern identified\n\
         - Third pattern identified\n\
         - Fourth pattern identified\n\
         \n\
         RECOMMENDATIONS:\n\
         - First actionable suggestion for improvement\n\
         - Second suggestion\n\
         - Third suggestion\n\
         \n\
         Focus your analysis on:\n\
         - Turn-taking balance and interruption patterns\n\
         - Directness vs. indirectness in communication\n\
         - Formality levels and power dynamics\n\
         - Active listening indicators\n\
         - Conflict resolution approaches\n\
         - Cultural communication preferences\n\
         \n\
         IMPORTANT: Use plain text only. Do not use asterisks (*), double asterisks (**), or any \
         markdown formatting. Each bullet point should start with a single hyphen (-) followed by a space."
    )
}

const fn speaker_label(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::A => "A",
        Speaker::B => "B",
        Speaker::Unknown => "unknown",
    }
}

// -- Response parsing --

/// Split the reply into its labelled sections
///
/// The first occurrence of each header wins; content runs until the next
/// recognized header or the end of the text.
fn parse_sections(text: &str) -> SectionedAnalysis {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    let header = HEADER.get_or_init(|| {
        Regex::new(r"(?i)\b(SUMMARY|KEY POINTS|CULTURAL OBSERVATIONS|COMMUNICATION PATTERNS|RECOMMENDATIONS):")
            .expect("must be valid regex")
    });

    let found: Vec<(usize, usize, String)> = header
        .captures_iter(text)
        .filter_map(|captures| {
            let whole = captures.get(0)?;
            let label = captures.get(1)?.as_str().to_ascii_uppercase();
            Some((whole.start(), whole.end(), label))
        })
        .collect();

    let mut analysis = SectionedAnalysis::default();
    for (index, (_, content_start, label)) in found.iter().enumerate() {
        let content_end = found.get(index + 1).map_or(text.len(), |next| next.0);
        let block = &text[*content_start..content_end];

        match label.as_str() {
            "SUMMARY" if analysis.summary.is_empty() => analysis.summary = clean_markdown(block),
            "KEY POINTS" if analysis.key_points.is_empty() => {
                analysis.key_points = extract_bullets(block);
            }
            "CULTURAL OBSERVATIONS" if analysis.cultural_observations.is_empty() => {
                analysis.cultural_observations = extract_bullets(block);
            }
            "COMMUNICATION PATTERNS" if analysis.communication_patterns.is_empty() => {
                analysis.communication_patterns = extract_bullets(block);
            }
            "RECOMMENDATIONS" if analysis.recommendations.is_empty() => {
                analysis.recommendations = extract_bullets(block);
            }
            _ => {}
        }
    }
    analysis
}

fn extract_bullets(block: &str) -> Vec<String> {
    static NUMBERED: OnceLock<Regex> = OnceLock::new();
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let numbered = NUMBERED.get_or_init(|| Regex::new(r"^\d+\.").expect("must be valid regex"));
    let prefix = PREFIX.get_or_init(|| Regex::new(r"^[-*\d.]+\s*").expect("must be valid regex"));

    block
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('-') || line.starts_with('*') || numbered.is_match(line))
        .map(|line| clean_markdown(&prefix.replace(line, "")))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Strip bold and italic markers plus stray asterisks
fn clean_markdown(text: &str) -> String {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    static ITALIC: OnceLock<Regex> = OnceLock::new();
    let bold = BOLD.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("must be valid regex"));
    let italic = ITALIC.get_or_init(|| Regex::new(r"\*([^*]+)\*").expect("must be valid regex"));

    let text = bold.replace_all(text, "$1");
    let text = italic.replace_all(&text, "$1");
    text.replace('*', "").trim().to_owned()
}
