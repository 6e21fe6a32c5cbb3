use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Gemini transcript analysis configuration
///
/// Without an `api_key` the analysis pipeline falls back to locally
/// generated insights, so this whole section is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Gemini API key
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Model used for insight generation
    #[serde(default = "default_model")]
    pub model: String,

    /// Override the API base URL (used by tests)
    #[serde(default)]
    pub base_url: Option<Url>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: None,
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
