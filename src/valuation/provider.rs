use std::env;
use std::fmt;

use reqwest::StatusCode;
use serde::Serialize;

/// Default chat-completions endpoint (Groq's OpenAI-compatible API).
pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default model used for valuation reasoning.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Environment variable holding the provider credential.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Immutable provider configuration, fixed at construction.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub model: String,
    /// Optional transport-level request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: None,
        }
    }
}

pub fn is_api_key_present() -> bool {
    env::var(API_KEY_ENV)
        .ok()
        .is_some_and(|value| !value.trim().is_empty())
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Token accounting reported by the provider, when present.
#[derive(Debug, Clone)]
pub struct Usage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

#[derive(Debug)]
pub enum ValuationError {
    /// Request precondition failed; no remote call was made.
    MissingCompanyName,
    MissingApiKey { key_env: &'static str },
    Request { source: reqwest::Error },
    Api { status: StatusCode, body: String },
    EmptyResponse,
    UnparsableOutput { detail: String },
    Internal { message: String },
}

impl fmt::Display for ValuationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCompanyName => write!(f, "Company name is required."),
            Self::MissingApiKey { key_env } => {
                write!(f, "{key_env} is not set in the environment")
            }
            Self::Request { source } => write!(f, "provider request failed: {source}"),
            Self::Api { status, body } => write!(f, "provider API error {status}: {body}"),
            Self::EmptyResponse => write!(f, "Empty or invalid response from provider."),
            Self::UnparsableOutput { detail } => {
                write!(f, "Could not parse final JSON from model output after cleaning: {detail}")
            }
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ValuationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request { source } => Some(source),
            _ => None,
        }
    }
}
