//! Task suggestion client for daily-check
//!
//! Turns a free-text task name into a [`TaskSuggestion`] by asking an
//! OpenAI-compatible chat completion endpoint. Every failure is reported as a
//! single opaque [`SuggestError`].
//!
//! [`TaskSuggestion`]: daily_check_core::TaskSuggestion

mod client;
mod config;
mod error;

pub use client::{HttpSuggestionClient, SuggestionClient, parse_completion};
pub use config::SuggestConfig;
pub use error::{Result, SuggestError};
