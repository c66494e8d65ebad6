//! Bridges rig's OpenAI client to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;

use crate::error::LlmError;
use crate::llm::provider::{CompletionRequest, CompletionResponse, LlmProvider};

const PROVIDER: &str = "openai";

/// `LlmProvider` backed by a rig OpenAI client.
pub struct RigAdapter {
    client: rig::client::Client<openai::client::OpenAIResponsesExt>,
    model: String,
}

impl RigAdapter {
    pub fn new(
        client: rig::client::Client<openai::client::OpenAIResponsesExt>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl LlmProvider for RigAdapter {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if request.prompt.trim().is_empty() {
            return Err(LlmError::InvalidRequest {
                provider: PROVIDER.to_string(),
                reason: "request has an empty prompt".to_string(),
            });
        }

        let mut builder = self.client.agent(self.model.as_str());
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }
        let agent = builder.build();

        let content = agent
            .prompt(request.prompt)
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        Ok(CompletionResponse { content })
    }
}
