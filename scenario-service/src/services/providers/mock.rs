//! Mock provider implementation for testing.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::sync::Mutex;

/// Canned behaviour of the mock.
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Empty,
    Fail(String),
    Unconfigured,
}

/// Mock text provider for testing.
///
/// Returns the same canned reply for every call and remembers the last
/// prompt and parameters it received.
pub struct MockTextProvider {
    reply: MockReply,
    last_call: Mutex<Option<(String, GenerationParams)>>,
}

impl MockTextProvider {
    fn with_reply(reply: MockReply) -> Self {
        Self {
            reply,
            last_call: Mutex::new(None),
        }
    }

    /// Reply with `text` as the model output.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_reply(MockReply::Text(text.into()))
    }

    /// Reply with a response that carries no text.
    pub fn empty() -> Self {
        Self::with_reply(MockReply::Empty)
    }

    /// Fail every call with an API error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(MockReply::Fail(message.into()))
    }

    /// Behave like a provider without an API key.
    pub fn unconfigured() -> Self {
        Self::with_reply(MockReply::Unconfigured)
    }

    /// Prompt and parameters of the most recent call.
    pub fn last_call(&self) -> Option<(String, GenerationParams)> {
        self.last_call
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        *self
            .last_call
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) =
            Some((prompt.to_string(), params.clone()));

        let text = match &self.reply {
            MockReply::Text(text) => Some(text.clone()),
            MockReply::Empty => None,
            MockReply::Fail(message) => return Err(ProviderError::ApiError(message.clone())),
            MockReply::Unconfigured => {
                return Err(ProviderError::NotConfigured(
                    super::gemini::API_KEY_MISSING.to_string(),
                ))
            }
        };

        Ok(ProviderResponse {
            output_tokens: text.as_ref().map(|t| t.len() as i32 / 4).unwrap_or(0),
            text,
            input_tokens: prompt.len() as i32 / 4,
            finish_reason: FinishReason::Complete,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match self.reply {
            MockReply::Unconfigured => Err(ProviderError::NotConfigured(
                super::gemini::API_KEY_MISSING.to_string(),
            )),
            _ => Ok(()),
        }
    }
}
