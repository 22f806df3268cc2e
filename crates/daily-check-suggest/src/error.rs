//! Error type for suggestion requests

/// Result type for suggestion operations
pub type Result<T> = std::result::Result<T, SuggestError>;

/// Any failure while fetching a suggestion.
///
/// Transport, authentication and malformed-response problems all collapse into
/// this one error; callers only show it and let the user retry.
#[derive(Debug, thiserror::Error)]
#[error("could not fetch a task suggestion: {detail}")]
pub struct SuggestError {
    detail: String,
}

impl SuggestError {
    /// Wrap a failure description.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// Diagnostic detail, suitable for logs.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}
