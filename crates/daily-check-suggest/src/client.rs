//! Suggestion client implementations

use daily_check_core::{TaskSuggestion, normalize_check_in_time};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{Result, SuggestConfig, SuggestError};

/// Anything that can turn a task name into suggested task fields.
pub trait SuggestionClient {
    /// Ask for a suggestion based on the in-progress task name.
    ///
    /// # Errors
    /// Returns [`SuggestError`] on any transport, authentication or
    /// response-format failure.
    fn suggest(&self, input: &str) -> Result<TaskSuggestion>;
}

impl<C> SuggestionClient for &C
where
    C: SuggestionClient + ?Sized,
{
    fn suggest(&self, input: &str) -> Result<TaskSuggestion> {
        (*self).suggest(input)
    }
}

/// Client for OpenAI-compatible chat completion endpoints.
///
/// The call blocks until the service answers; no timeout is applied beyond the
/// transport's own.
pub struct HttpSuggestionClient {
    config: SuggestConfig,
    api_key: String,
    agent: ureq::Agent,
}

impl HttpSuggestionClient {
    /// Create a client with an explicit API key.
    #[must_use]
    pub fn new(config: SuggestConfig, api_key: impl Into<String>) -> Self {
        Self {
            config,
            api_key: api_key.into(),
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    /// Create a client reading the API key from the configured environment variable.
    ///
    /// # Errors
    /// Returns [`SuggestError`] when the variable is unset or empty.
    pub fn from_env(config: SuggestConfig) -> Result<Self> {
        let key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| SuggestError::new(format!("{} is not set", config.api_key_env)))?;
        Ok(Self::new(config, key))
    }

    fn request_body(&self, input: &str) -> serde_json::Value {
        let system = format!(
            "You help people plan a daily checklist. Given a rough task name, reply with a single \
             JSON object and nothing else, using exactly these string fields: \"name\" (a short task \
             name), \"description\" (one or two sentences), \"checkInTime\" (24-hour HH:mm), \
             \"device\" (the device the task is done on, such as Phone or Laptop) and \"appOrUrl\" \
             (the app name or website used). Write every value in {}.",
            self.config.language
        );
        serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": input },
            ],
            "temperature": 0.3,
        })
    }
}

impl SuggestionClient for HttpSuggestionClient {
    fn suggest(&self, input: &str) -> Result<TaskSuggestion> {
        let url = self.config.completions_url();
        let body = serde_json::to_string(&self.request_body(input))
            .map_err(|e| SuggestError::new(format!("request serialization failed: {e}")))?;

        debug!(%url, model = %self.config.model, "requesting task suggestion");
        let response = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Content-Type", "application/json")
            .send_string(&body)
            .map_err(|err| {
                let detail = match err {
                    ureq::Error::Status(code, _) => format!("service answered HTTP {code}"),
                    ureq::Error::Transport(transport) => format!("transport error: {transport}"),
                };
                warn!(%url, %detail, "suggestion request failed");
                SuggestError::new(detail)
            })?;

        let text = response
            .into_string()
            .map_err(|e| SuggestError::new(format!("failed to read response: {e}")))?;
        let suggestion = parse_completion(&text).inspect_err(|err| {
            warn!(detail = err.detail(), "suggestion response was malformed");
        })?;
        info!(name = %suggestion.name, "received task suggestion");
        Ok(suggestion)
    }
}

#[derive(Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

/// Extract a [`TaskSuggestion`] from a chat completion response body.
///
/// The model's reply may wrap the JSON object in prose or code fences; the
/// outermost `{...}` is used. The name must be present and the check-in time
/// must be a valid time of day (it is zero-padded on the way out). Blank
/// description, device or app fields are accepted and stay blank.
///
/// # Errors
/// Returns [`SuggestError`] when the body or the embedded object is malformed.
pub fn parse_completion(body: &str) -> Result<TaskSuggestion> {
    let completion: Completion = serde_json::from_str(body)
        .map_err(|e| SuggestError::new(format!("unexpected response shape: {e}")))?;
    let content = completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| SuggestError::new("response contained no choices"))?;

    let object = match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => return Err(SuggestError::new("reply did not contain a JSON object")),
    };
    let mut suggestion: TaskSuggestion = serde_json::from_str(object)
        .map_err(|e| SuggestError::new(format!("reply object is malformed: {e}")))?;

    if suggestion.name.trim().is_empty() {
        return Err(SuggestError::new("reply is missing a name"));
    }
    suggestion.check_in_time = normalize_check_in_time(&suggestion.check_in_time)
        .map_err(|e| SuggestError::new(e.to_string()))?;

    let blank: Vec<&str> = [
        ("description", &suggestion.description),
        ("device", &suggestion.device),
        ("appOrUrl", &suggestion.app_or_url),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect();
    if !blank.is_empty() {
        debug!(name = %suggestion.name, ?blank, "suggestion reply left fields blank");
    }
    Ok(suggestion)
}
