//! Pipeline orchestration
//!
//! ```text
//! single subject:  responses → profile → apply_domain → compile
//! population:      respondents → cluster → per cluster: demographics vote,
//!                  apply_domain(centroid) → compile
//! ```

use persona_cluster::{aggregate_demographics, ClusterEngine, RandomSource, RngSource};
use persona_compiler::{RuleBook, SpecCompiler};
use persona_core::{
    Cluster, CompiledSpecification, Demographics, DomainLexicon, ItemCatalog, PersonaResult,
    PipelineConfig, ProfileVector, RawResponseSet, RespondentRecord, ValidationResult,
};
use persona_profile::{apply_domain, build_profile};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Compiled output for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSpecification {
    /// Profile as aggregated from the answers.
    pub profile: ProfileVector,
    /// Profile after the domain modifier.
    pub adjusted: ProfileVector,
    pub specification: CompiledSpecification,
}

/// One discovered archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archetype {
    pub cluster: Cluster,
    /// Majority value per demographic field among the members.
    pub demographics: Demographics,
    pub specification: CompiledSpecification,
}

/// Immutable pipeline: catalog, lexicon, rule table and settings are fixed
/// at construction and shared by reference.
#[derive(Debug, Clone)]
pub struct PersonaPipeline {
    catalog: ItemCatalog,
    lexicon: DomainLexicon,
    compiler: SpecCompiler,
    engine: ClusterEngine,
    config: PipelineConfig,
}

impl PersonaPipeline {
    /// Build a pipeline. Fails with `InvalidValue` for unusable settings.
    pub fn new(config: PipelineConfig, lexicon: DomainLexicon, rules: RuleBook) -> PersonaResult<Self> {
        config.validate()?;
        Ok(Self {
            catalog: ItemCatalog::standard(),
            engine: ClusterEngine::new(config.cluster.clone())?,
            compiler: SpecCompiler::new(rules, config.compiler.clone()),
            lexicon,
            config,
        })
    }

    /// Pipeline with built-in lexicon and rule table.
    pub fn with_config(config: PipelineConfig) -> PersonaResult<Self> {
        Self::new(config, DomainLexicon::builtin(), RuleBook::builtin())
    }

    /// Replace the item catalog.
    pub fn with_catalog(mut self, catalog: ItemCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn lexicon(&self) -> &DomainLexicon {
        &self.lexicon
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Random source from the configured seed, or OS entropy when unset.
    pub fn random_source(&self) -> RngSource<StdRng> {
        match self.config.seed {
            Some(seed) => RngSource::seeded(seed),
            None => RngSource::from_entropy(),
        }
    }

    /// Normalize and aggregate a response set.
    pub fn profile(&self, responses: &RawResponseSet) -> PersonaResult<ProfileVector> {
        build_profile(responses, &self.catalog)
    }

    /// Apply a domain and compile an already aggregated profile.
    pub fn compile_profile(
        &self,
        profile: &ProfileVector,
        domain: &str,
        demographics: &Demographics,
    ) -> (ProfileVector, CompiledSpecification) {
        let domain = self.lexicon.resolve(domain);
        let adjusted = apply_domain(profile, domain);
        let specification = self.compiler.compile(&adjusted, domain, demographics);
        (adjusted, specification)
    }

    /// Single-subject path: answers to specification.
    pub fn compile_subject(
        &self,
        responses: &RawResponseSet,
        domain: &str,
        demographics: &Demographics,
    ) -> PersonaResult<SubjectSpecification> {
        let profile = self.profile(responses)?;
        let (adjusted, specification) = self.compile_profile(&profile, domain, demographics);
        tracing::info!(
            domain = %specification.domain,
            rules = specification.applied_rules.len(),
            "Compiled subject specification"
        );
        Ok(SubjectSpecification {
            profile,
            adjusted,
            specification,
        })
    }

    /// Population path: one specification per discovered archetype, largest first.
    #[tracing::instrument(skip_all, fields(respondents = respondents.len(), domain = %domain))]
    pub fn archetypes(
        &self,
        respondents: &[RespondentRecord],
        domain: &str,
        rng: &mut dyn RandomSource,
    ) -> PersonaResult<Vec<Archetype>> {
        let run = self.engine.cluster(respondents, rng)?;

        let archetypes: Vec<Archetype> = run
            .clusters
            .into_iter()
            .map(|cluster| {
                let demographics = aggregate_demographics(&cluster.members);
                let (_, specification) = self.compile_profile(&cluster.centroid, domain, &demographics);
                Archetype {
                    cluster,
                    demographics,
                    specification,
                }
            })
            .collect();

        tracing::info!(archetypes = archetypes.len(), "Compiled archetypes");
        Ok(archetypes)
    }

    /// Compare a profile with raw self-assessment answers.
    pub fn validate(
        &self,
        input: &ProfileVector,
        assessed_answers: &RawResponseSet,
    ) -> PersonaResult<ValidationResult> {
        persona_validation::validate(input, assessed_answers, &self.catalog, &self.config.validation)
    }
}

impl Default for PersonaPipeline {
    fn default() -> Self {
        Self {
            catalog: ItemCatalog::standard(),
            lexicon: DomainLexicon::builtin(),
            compiler: SpecCompiler::default(),
            engine: ClusterEngine::default(),
            config: PipelineConfig::default(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::{ClusterSettings, ConfigError, PersonaError};
    use persona_test_utils::fixtures::{engineer_demographics, hostile_engineer_responses, uniform_responses};

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = PipelineConfig::default();
        config.cluster = ClusterSettings::with_bounds(0, 0);
        let err = PersonaPipeline::with_config(config).unwrap_err();
        assert!(matches!(err, PersonaError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_compile_subject_applies_domain() {
        let pipeline = PersonaPipeline::default();
        let subject = pipeline
            .compile_subject(&hostile_engineer_responses(), "eng", &engineer_demographics())
            .unwrap();

        assert_eq!(subject.specification.domain, "engineering");
        assert_eq!(subject.adjusted.domain_skepticism, 0.7);
        assert_eq!(subject.profile.domain_skepticism, 0.0);
        assert!(subject.specification.applied("skepticalReview"));
        assert!(subject.specification.text.contains("You are Riley"));
    }

    #[test]
    fn test_unknown_domain_falls_back_to_general() {
        let pipeline = PersonaPipeline::default();
        let subject = pipeline
            .compile_subject(&uniform_responses(3), "underwater basket weaving", &Demographics::new())
            .unwrap();
        assert_eq!(subject.specification.domain, "general");
        assert_eq!(subject.adjusted, subject.profile);
    }

    #[test]
    fn test_seeded_random_source_is_reproducible() {
        let config = PipelineConfig {
            seed: Some(11),
            ..PipelineConfig::default()
        };
        let pipeline = PersonaPipeline::with_config(config).unwrap();
        let mut a = pipeline.random_source();
        let mut b = pipeline.random_source();
        assert_eq!(a.next_index(1000), b.next_index(1000));
    }
}
