//! Self-validation: interview a compiled specification and compare.

use crate::PersonaPipeline;
use persona_core::{CompiledSpecification, LlmError, PersonaError, PersonaResult, ProfileVector, ValidationResult};
use persona_llm::{TextGenerator, UsageTracker};
use persona_validation::parse_self_assessment;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of a self-validation round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Completed(ValidationResult),
    /// The generator's answers could not be turned into a response set.
    ParseFailure { reason: String, raw: String },
}

impl ValidationOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Completed(result) if result.passed)
    }

    pub fn result(&self) -> Option<&ValidationResult> {
        match self {
            Self::Completed(result) => Some(result),
            Self::ParseFailure { .. } => None,
        }
    }
}

/// Runs the questionnaire against a generator.
pub struct SelfValidation {
    generator: Arc<dyn TextGenerator>,
    usage: Arc<UsageTracker>,
}

impl SelfValidation {
    pub fn new(generator: Arc<dyn TextGenerator>, usage: Arc<UsageTracker>) -> Self {
        Self { generator, usage }
    }

    /// Interview `specification` and compare the answers with `input`.
    ///
    /// Unparseable or out-of-range answers become `ParseFailure`; transport
    /// errors from the generator are returned as `Err`.
    #[tracing::instrument(skip_all, fields(model = self.generator.model_id()))]
    pub async fn run(
        &self,
        pipeline: &PersonaPipeline,
        input: &ProfileVector,
        specification: &CompiledSpecification,
    ) -> PersonaResult<ValidationOutcome> {
        let questions = pipeline.catalog().question_set();
        let raw = self
            .generator
            .self_assess(&specification.text, &questions)
            .await?;
        self.usage.record_self_assessment();

        let answers = match parse_self_assessment(&raw, pipeline.catalog()) {
            Ok(answers) => answers,
            Err(LlmError::ParseFailure { reason }) => {
                tracing::warn!(%reason, "Self-assessment parse failure");
                return Ok(ValidationOutcome::ParseFailure { reason, raw });
            }
            Err(other) => return Err(other.into()),
        };

        match pipeline.validate(input, &answers) {
            Ok(result) => Ok(ValidationOutcome::Completed(result)),
            Err(PersonaError::Response(e)) => {
                let reason = e.to_string();
                tracing::warn!(%reason, "Self-assessment answers rejected");
                Ok(ValidationOutcome::ParseFailure { reason, raw })
            }
            Err(other) => Err(other),
        }
    }
}

impl std::fmt::Debug for SelfValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelfValidation")
            .field("model", &self.generator.model_id())
            .field("usage", &self.usage)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::Demographics;
    use persona_llm::{EchoGenerator, ScriptedGenerator};
    use persona_test_utils::fixtures::{hostile_engineer_responses, mirroring_generator};

    fn setup() -> (PersonaPipeline, ProfileVector, CompiledSpecification) {
        let pipeline = PersonaPipeline::default();
        let subject = pipeline
            .compile_subject(&hostile_engineer_responses(), "general", &Demographics::new())
            .unwrap();
        (pipeline, subject.profile, subject.specification)
    }

    #[tokio::test]
    async fn test_mirroring_generator_passes() {
        let (pipeline, profile, spec) = setup();
        let usage = Arc::new(UsageTracker::new());
        let validation = SelfValidation::new(
            Arc::new(mirroring_generator(&hostile_engineer_responses())),
            usage.clone(),
        );

        let outcome = validation.run(&pipeline, &profile, &spec).await.unwrap();
        assert!(outcome.passed());
        assert_eq!(outcome.result().unwrap().correlation, 1.0);
        assert_eq!(usage.self_assessments(), 1);
    }

    #[tokio::test]
    async fn test_neutral_generator_fails_with_hints() {
        let (pipeline, profile, spec) = setup();
        let validation = SelfValidation::new(Arc::new(EchoGenerator::new("echo")), Arc::new(UsageTracker::new()));

        let outcome = validation.run(&pipeline, &profile, &spec).await.unwrap();
        let result = outcome.result().unwrap();
        assert!(!result.passed);
        assert_eq!(result.correlation, 0.0);
        assert_eq!(result.hints.len(), 3);
    }

    #[tokio::test]
    async fn test_prose_reply_is_parse_failure() {
        let (pipeline, profile, spec) = setup();
        let generator = ScriptedGenerator::new("chatty").with_self_assessment("I prefer not to rate myself.");
        let validation = SelfValidation::new(Arc::new(generator), Arc::new(UsageTracker::new()));

        let outcome = validation.run(&pipeline, &profile, &spec).await.unwrap();
        match outcome {
            ValidationOutcome::ParseFailure { raw, .. } => assert_eq!(raw, "I prefer not to rate myself."),
            other => panic!("expected parse failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_out_of_range_reply_is_parse_failure() {
        let (pipeline, profile, spec) = setup();
        let generator = EchoGenerator::new("echo").with_score(7);
        let validation = SelfValidation::new(Arc::new(generator), Arc::new(UsageTracker::new()));

        let outcome = validation.run(&pipeline, &profile, &spec).await.unwrap();
        assert!(matches!(outcome, ValidationOutcome::ParseFailure { .. }));
        assert!(!outcome.passed());
    }
}
