//! `TextGenerator` over chat completions

use super::client::OpenAiClient;
use super::types::{CompletionRequest, CompletionResponse, Message};
use crate::prompt::build_self_assessment_prompt;
use crate::providers::invalid_response;
use crate::{Generation, TextGenerator, Turn};
use async_trait::async_trait;
use persona_core::{PersonaResult, Question};

/// Generator backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiCompatibleGenerator {
    client: OpenAiClient,
    model: String,
    temperature: f32,
    max_tokens: i32,
}

impl OpenAiCompatibleGenerator {
    /// Create a generator for `model` on api.openai.com.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_client(OpenAiClient::new(api_key, 60), model)
    }

    /// Create a generator over a preconfigured client.
    pub fn with_client(client: OpenAiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: 0.7,
            max_tokens: 1024,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: i32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    async fn complete(&self, messages: Vec<Message>, temperature: f32) -> PersonaResult<Generation> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(self.max_tokens),
            temperature: Some(temperature),
        };

        let response: CompletionResponse = self.client.request("chat/completions", request).await?;
        let token_count = response.usage.as_ref().map(|u| u.total_tokens).unwrap_or(0);
        let text = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| invalid_response("openai", "No completion in response"))?;

        Ok(Generation { text, token_count })
    }
}

/// System message followed by the conversation.
pub(crate) fn chat_messages(specification: &str, history: &[Turn]) -> Vec<Message> {
    std::iter::once(Message::new("system", specification))
        .chain(history.iter().map(|t| Message::new(t.role.as_str(), t.content.clone())))
        .collect()
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleGenerator {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, specification: &str, history: &[Turn]) -> PersonaResult<Generation> {
        self.complete(chat_messages(specification, history), self.temperature)
            .await
    }

    async fn self_assess(&self, specification: &str, questions: &[Question]) -> PersonaResult<String> {
        let history = [Turn::user(build_self_assessment_prompt(questions))];
        // Low temperature keeps answers stable between interviews.
        let generation = self
            .complete(chat_messages(specification, &history), 0.0)
            .await?;
        Ok(generation.text)
    }
}

impl std::fmt::Debug for OpenAiCompatibleGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleGenerator")
            .field("client", &self.client)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}
