//! Conversation with a compiled persona.

use persona_core::{CompiledSpecification, PersonaResult};
use persona_llm::{TextGenerator, Turn, UsageTracker};
use std::sync::Arc;

/// Holds one specification and its conversation history.
pub struct PersonaSession {
    specification: CompiledSpecification,
    history: Vec<Turn>,
    generator: Arc<dyn TextGenerator>,
    usage: Arc<UsageTracker>,
}

impl PersonaSession {
    pub fn new(
        specification: CompiledSpecification,
        generator: Arc<dyn TextGenerator>,
        usage: Arc<UsageTracker>,
    ) -> Self {
        Self {
            specification,
            history: Vec::new(),
            generator,
            usage,
        }
    }

    pub fn specification(&self) -> &CompiledSpecification {
        &self.specification
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Send a user message and return the persona's reply.
    ///
    /// On error the user turn is rolled back so the history stays paired.
    pub async fn send(&mut self, message: impl Into<String>) -> PersonaResult<String> {
        self.history.push(Turn::user(message));
        let generation = match self
            .generator
            .generate(&self.specification.text, &self.history)
            .await
        {
            Ok(generation) => generation,
            Err(e) => {
                self.history.pop();
                return Err(e);
            }
        };

        self.usage.record_generation(&generation);
        tracing::debug!(
            turns = self.history.len() + 1,
            tokens = generation.token_count,
            "Persona replied"
        );
        self.history.push(Turn::assistant(generation.text.clone()));
        Ok(generation.text)
    }

    /// Drop the conversation, keep the specification.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

impl std::fmt::Debug for PersonaSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonaSession")
            .field("domain", &self.specification.domain)
            .field("turns", &self.history.len())
            .field("model", &self.generator.model_id())
            .finish()
    }
}
