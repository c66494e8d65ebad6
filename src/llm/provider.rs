//! Provider-neutral completion types and the `LlmProvider` trait.

use async_trait::async_trait;

use crate::error::LlmError;

/// A single-prompt completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Response from a completion call.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
}

/// Anything that can answer a completion request.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn model_name(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_sets_sampling_options() {
        let request = CompletionRequest::new("summarize")
            .with_temperature(0.3)
            .with_max_tokens(700);

        assert_eq!(request.prompt, "summarize");
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.max_tokens, Some(700));
    }

    #[test]
    fn request_defaults_to_provider_sampling() {
        let request = CompletionRequest::new("hi");
        assert!(request.temperature.is_none());
        assert!(request.max_tokens.is_none());
    }
}
