//! PERSONA LLM - Text generator boundary
//!
//! Provider-agnostic traits for the external text generator that acts out a
//! compiled specification. The pipeline never talks to a provider directly;
//! it goes through a [`TextGenerator`] taken from a [`GeneratorRegistry`].

pub mod mock;
pub mod prompt;
pub mod providers;

pub use mock::{EchoGenerator, ScriptedGenerator};
pub use prompt::{build_self_assessment_prompt, SELF_ASSESSMENT_INSTRUCTIONS};
pub use providers::OpenAiCompatibleGenerator;

use async_trait::async_trait;
use persona_core::{LlmError, PersonaResult, Question};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

// ============================================================================
// CONVERSATION TYPES
// ============================================================================

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One message of conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Generated reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    /// Tokens billed for the call, as reported by the provider.
    pub token_count: i64,
}

// ============================================================================
// TEXT GENERATOR TRAIT
// ============================================================================

/// External text generator.
/// Implementations must be thread-safe (Send + Sync).
///
/// # Example
/// ```ignore
/// struct MyGenerator { /* ... */ }
///
/// #[async_trait]
/// impl TextGenerator for MyGenerator {
///     fn model_id(&self) -> &str { "my-model" }
///     async fn generate(&self, specification: &str, history: &[Turn]) -> PersonaResult<Generation> {
///         // call the provider
///     }
///     async fn self_assess(&self, specification: &str, questions: &[Question]) -> PersonaResult<String> {
///         // ask the questionnaire in character, return the raw reply
///     }
/// }
/// ```
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier, used in logs.
    fn model_id(&self) -> &str;

    /// Produce the next assistant turn with `specification` as instruction
    /// context. `history` ends with the user turn being answered.
    async fn generate(&self, specification: &str, history: &[Turn]) -> PersonaResult<Generation>;

    /// Answer the questionnaire in character and return the raw reply.
    ///
    /// Parsing is the caller's job; a reply that cannot be parsed is not an
    /// error at this level.
    async fn self_assess(&self, specification: &str, questions: &[Question]) -> PersonaResult<String>;
}

// ============================================================================
// GENERATOR REGISTRY
// ============================================================================

/// Holds the configured generator. Explicit registration, no auto-discovery.
pub struct GeneratorRegistry {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self { generator: None }
    }

    pub fn register(&mut self, generator: Box<dyn TextGenerator>) {
        tracing::info!(model = generator.model_id(), "Registered text generator");
        self.generator = Some(Arc::from(generator));
    }

    /// The registered generator, or `ProviderNotConfigured`.
    pub fn generator(&self) -> PersonaResult<Arc<dyn TextGenerator>> {
        self.generator
            .clone()
            .ok_or_else(|| LlmError::ProviderNotConfigured.into())
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub fn clear(&mut self) {
        self.generator = None;
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generator", &self.generator.as_ref().map(|g| g.model_id().to_string()))
            .finish()
    }
}

// ============================================================================
// USAGE TRACKER
// ============================================================================

/// Accumulates generator usage across calls. Shareable between tasks.
pub struct UsageTracker {
    generations: AtomicI64,
    tokens: AtomicI64,
    self_assessments: AtomicI64,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self {
            generations: AtomicI64::new(0),
            tokens: AtomicI64::new(0),
            self_assessments: AtomicI64::new(0),
        }
    }

    pub fn record_generation(&self, generation: &Generation) {
        self.generations.fetch_add(1, Ordering::Relaxed);
        self.tokens.fetch_add(generation.token_count, Ordering::Relaxed);
    }

    pub fn record_self_assessment(&self) {
        self.self_assessments.fetch_add(1, Ordering::Relaxed);
    }

    pub fn generations(&self) -> i64 {
        self.generations.load(Ordering::Relaxed)
    }

    pub fn tokens(&self) -> i64 {
        self.tokens.load(Ordering::Relaxed)
    }

    pub fn self_assessments(&self) -> i64 {
        self.self_assessments.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.generations.store(0, Ordering::Relaxed);
        self.tokens.store(0, Ordering::Relaxed);
        self.self_assessments.store(0, Ordering::Relaxed);
    }
}

impl Default for UsageTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UsageTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageTracker")
            .field("generations", &self.generations())
            .field("tokens", &self.tokens())
            .field("self_assessments", &self.self_assessments())
            .finish()
    }
}

// ============================================================================
// UNIT TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::PersonaError;
    use proptest::prelude::*;

    #[test]
    fn test_registry_new_is_empty() {
        let registry = GeneratorRegistry::new();
        assert!(!registry.has_generator());
        assert_eq!(
            registry.generator().err(),
            Some(PersonaError::Llm(LlmError::ProviderNotConfigured))
        );
    }

    #[test]
    fn test_registry_register_and_clear() {
        let mut registry = GeneratorRegistry::new();
        registry.register(Box::new(EchoGenerator::new("echo-1")));
        assert!(registry.has_generator());
        assert_eq!(registry.generator().unwrap().model_id(), "echo-1");
        assert!(format!("{:?}", registry).contains("echo-1"));

        registry.clear();
        assert!(!registry.has_generator());
    }

    #[test]
    fn test_usage_tracker_accumulates() {
        let tracker = UsageTracker::new();
        tracker.record_generation(&Generation {
            text: "a".to_string(),
            token_count: 12,
        });
        tracker.record_generation(&Generation {
            text: "b".to_string(),
            token_count: 30,
        });
        tracker.record_self_assessment();
        assert_eq!(tracker.generations(), 2);
        assert_eq!(tracker.tokens(), 42);
        assert_eq!(tracker.self_assessments(), 1);

        tracker.reset();
        assert_eq!(tracker.tokens(), 0);
    }

    #[test]
    fn test_turn_serde() {
        let json = serde_json::to_string(&Turn::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_tracker_sums_tokens(counts in prop::collection::vec(0i64..10_000, 0..50)) {
            let tracker = UsageTracker::new();
            for count in &counts {
                tracker.record_generation(&Generation { text: String::new(), token_count: *count });
            }
            prop_assert_eq!(tracker.tokens(), counts.iter().sum::<i64>());
            prop_assert_eq!(tracker.generations(), counts.len() as i64);
        }
    }
}
