//! Suggestion service configuration

use serde::{Deserialize, Serialize};

/// Connection settings for the suggestion service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    /// Base URL of the OpenAI-compatible API (with or without `/v1`)
    pub endpoint: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Language the suggested fields are written in
    pub language: String,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            api_key_env: "DAILY_CHECK_API_KEY".into(),
            language: "English".into(),
        }
    }
}

impl SuggestConfig {
    /// Full URL of the chat completions endpoint
    #[must_use]
    pub fn completions_url(&self) -> String {
        let base = self.endpoint.trim_end_matches('/');
        let base = base.strip_suffix("/v1").unwrap_or(base);
        format!("{base}/v1/chat/completions")
    }
}
