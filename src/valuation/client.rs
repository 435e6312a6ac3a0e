use std::env;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::valuation::extract::{ValuationResult, extract_response};
use crate::valuation::prompt::build_messages;
use crate::valuation::provider::{
    API_KEY_ENV, ChatMessage, ProviderConfig, Usage, ValuationError,
};
use crate::valuation::request::ValuationRequest;

/// Wire payload for the chat-completions call.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// Builds the outbound payload without touching the credential, so
/// dry-run and tests work with no key configured.
pub fn build_payload(model: &str, request: &ValuationRequest) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: build_messages(request),
        response_format: ResponseFormat {
            kind: "json_object",
        },
    }
}

/// Successful valuation plus optional provider token accounting.
#[derive(Debug, Clone)]
pub struct ValuationResponse {
    pub result: ValuationResult,
    pub usage: Option<Usage>,
}

/// Chat-completions client bound to one provider configuration.
#[derive(Debug, Clone)]
pub struct ValuationClient {
    config: ProviderConfig,
    api_key: String,
    http: reqwest::Client,
}

impl ValuationClient {
    /// Creates a client with an explicitly injected credential.
    pub fn new(config: ProviderConfig, api_key: impl Into<String>) -> Self {
        Self {
            config,
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Creates a client reading the credential from `GROQ_API_KEY`.
    pub fn from_env(config: ProviderConfig) -> Result<Self, ValuationError> {
        let api_key = env::var(API_KEY_ENV).map_err(|_| ValuationError::MissingApiKey {
            key_env: API_KEY_ENV,
        })?;
        Ok(Self::new(config, api_key))
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Runs the full valuation pipeline for one startup profile.
    ///
    /// The company-name precondition is checked before anything leaves
    /// the process; classified extraction failures come back as values,
    /// never panics.
    pub async fn calculate(
        &self,
        request: &ValuationRequest,
    ) -> Result<ValuationResponse, ValuationError> {
        request.validate()?;

        let payload = build_payload(&self.config.model, request);
        debug!(
            endpoint = %self.config.endpoint,
            model = %self.config.model,
            "sending valuation request"
        );

        let mut http_request = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload);
        if let Some(timeout_secs) = self.config.timeout_secs {
            http_request = http_request.timeout(Duration::from_secs(timeout_secs));
        }

        let response = http_request
            .send()
            .await
            .map_err(|source| ValuationError::Request { source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ValuationError::Request { source })?;
        debug!(status = %status, bytes = body.len(), "provider responded");

        if !status.is_success() {
            return Err(ValuationError::Api { status, body });
        }

        let (result, usage) = extract_response(&body)?;
        Ok(ValuationResponse { result, usage })
    }
}
