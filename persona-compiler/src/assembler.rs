//! Specification assembly
//!
//! ```text
//! profile ──▶ RuleBook::evaluate ──▶ fired rules ─┐
//! demographics ─────────────────▶ identity ───────┼──▶ CompiledSpecification
//! domain ──▶ vocabulary + phrases + formatting ───┘
//! ```

use crate::RuleBook;
use persona_core::{CompiledSpecification, CompilerSettings, Demographics, DomainConfig, ProfileVector};

/// Emitted when no rule fires.
pub const NEUTRAL_DIRECTIVE: &str = "Keep a balanced, even-handed professional tone.";

const DEFAULT_NAME: &str = "a workplace persona";

/// Compiles profiles into behavioral specifications.
#[derive(Debug, Clone, Default)]
pub struct SpecCompiler {
    rules: RuleBook,
    settings: CompilerSettings,
}

impl SpecCompiler {
    pub fn new(rules: RuleBook, settings: CompilerSettings) -> Self {
        Self { rules, settings }
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    /// Compile a profile for a domain.
    ///
    /// Pure and infallible: a profile missing a dimension only stops rules
    /// that reference it from firing. `demographics` may carry `name`,
    /// `role` and `department` for the identity preamble.
    pub fn compile(
        &self,
        profile: &ProfileVector,
        domain: &DomainConfig,
        demographics: &Demographics,
    ) -> CompiledSpecification {
        let fired = self.rules.evaluate(profile);
        let applied_rules: Vec<String> = fired.iter().map(|r| r.id.as_str().to_string()).collect();

        let mut sections = vec![identity_section(domain, demographics)];

        let mut directives = String::from("## Behavior\n");
        if fired.is_empty() {
            directives.push_str(&format!("- {}\n", NEUTRAL_DIRECTIVE));
        } else {
            for rule in &fired {
                directives.push_str(&format!("- {}\n", rule.instruction));
            }
        }
        sections.push(directives);

        if let Some(language) = self.language_section(domain) {
            sections.push(language);
        }

        if !domain.formatting.is_empty() {
            let mut formatting = String::from("## Formatting\n");
            for directive in &domain.formatting {
                formatting.push_str(&format!("- {}\n", directive));
            }
            sections.push(formatting);
        }

        let text = sections.join("\n");
        tracing::debug!(
            domain = %domain.name,
            fired = applied_rules.len(),
            chars = text.len(),
            "Compiled specification"
        );

        CompiledSpecification {
            text,
            applied_rules,
            domain: domain.name.clone(),
        }
    }

    fn language_section(&self, domain: &DomainConfig) -> Option<String> {
        let vocabulary: Vec<&str> = domain
            .vocabulary
            .iter()
            .take(self.settings.vocabulary_sample)
            .map(String::as_str)
            .collect();
        let phrases: Vec<&str> = domain
            .phrases
            .iter()
            .take(self.settings.phrase_sample)
            .map(String::as_str)
            .collect();

        if vocabulary.is_empty() && phrases.is_empty() {
            return None;
        }

        let mut section = String::from("## Language\n");
        if !vocabulary.is_empty() {
            section.push_str(&format!("Use terms such as: {}.\n", vocabulary.join(", ")));
        }
        if !phrases.is_empty() {
            let quoted: Vec<String> = phrases.iter().map(|p| format!("\"{}\"", p)).collect();
            section.push_str(&format!("Characteristic phrases: {}\n", quoted.join(" ")));
        }
        Some(section)
    }
}

fn identity_section(domain: &DomainConfig, demographics: &Demographics) -> String {
    let name = demographics
        .get("name")
        .map(String::as_str)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(DEFAULT_NAME);

    let mut section = format!("## Identity\nYou are {}, working in the {} domain.\n", name, domain.label);
    if let Some(role) = demographics.get("role") {
        section.push_str(&format!("Role: {}\n", role));
    }
    if let Some(department) = demographics.get("department") {
        section.push_str(&format!("Department: {}\n", department));
    }
    section.push_str("Stay in character for the whole conversation.\n");
    section
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleId;
    use persona_core::DomainLexicon;
    use proptest::prelude::*;

    fn demographics(pairs: &[(&str, &str)]) -> Demographics {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_identity_preamble() {
        let lexicon = DomainLexicon::builtin();
        let compiler = SpecCompiler::default();
        let spec = compiler.compile(
            &ProfileVector::new(),
            lexicon.resolve("engineering"),
            &demographics(&[("name", "Dana"), ("role", "Staff Engineer"), ("department", "Platform")]),
        );
        assert!(spec.text.starts_with("## Identity\nYou are Dana, working in the Engineering domain.\n"));
        assert!(spec.text.contains("Role: Staff Engineer\n"));
        assert!(spec.text.contains("Department: Platform\n"));
        assert_eq!(spec.domain, "engineering");
    }

    #[test]
    fn test_neutral_directive_when_nothing_fires() {
        let lexicon = DomainLexicon::builtin();
        let spec = SpecCompiler::default().compile(&ProfileVector::new(), lexicon.general(), &Demographics::new());
        assert!(spec.applied_rules.is_empty());
        assert!(spec.text.contains(NEUTRAL_DIRECTIVE));
        assert!(spec.text.contains(DEFAULT_NAME));
    }

    #[test]
    fn test_instructions_follow_table_order() {
        let lexicon = DomainLexicon::builtin();
        let profile = ProfileVector::new()
            .with_trait("agreeableness", -0.9)
            .with_trait("directness", 0.9)
            .with_trait("diligence", 0.9);
        let compiler = SpecCompiler::default();
        let spec = compiler.compile(&profile, lexicon.general(), &Demographics::new());
        assert_eq!(
            spec.applied_rules,
            vec!["antiSycophancy", "directnessOverride", "chainOfThought"]
        );

        let position = |id: RuleId| {
            let instruction = &compiler.rules().get(id).unwrap().instruction;
            spec.text.find(instruction.as_str()).unwrap()
        };
        assert!(position(RuleId::AntiSycophancy) < position(RuleId::DirectnessOverride));
        assert!(position(RuleId::DirectnessOverride) < position(RuleId::ChainOfThought));
        assert!(!spec.text.contains(NEUTRAL_DIRECTIVE));
    }

    #[test]
    fn test_vocabulary_sample_and_formatting() {
        let lexicon = DomainLexicon::builtin();
        let engineering = lexicon.resolve("engineering");
        let compiler = SpecCompiler::new(
            RuleBook::builtin(),
            CompilerSettings {
                vocabulary_sample: 2,
                phrase_sample: 1,
            },
        );
        let spec = compiler.compile(&ProfileVector::new(), engineering, &Demographics::new());
        assert!(spec.text.contains("Use terms such as: root cause, edge case.\n"));
        assert!(!spec.text.contains("regression"));
        assert!(spec.text.contains("\"What does the data say?\""));
        assert!(spec.text.contains("- Use bullet points for lists of findings.\n"));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let lexicon = DomainLexicon::builtin();
        let profile = ProfileVector::new().with_trait("formality", 0.9).with_trait("humor", 0.8);
        let compiler = SpecCompiler::default();
        let a = compiler.compile(&profile, lexicon.resolve("legal"), &Demographics::new());
        let b = compiler.compile(&profile, lexicon.resolve("legal"), &Demographics::new());
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// applied_rules equals the set of rules whose condition holds, in table order.
        #[test]
        fn prop_applied_rules_match_conditions(values in prop::collection::vec(-1.0f64..=1.0, 14)) {
            let profile = ProfileVector::from_pairs(
                persona_core::TraitDimension::ALL.iter().map(|d| d.as_str()).zip(values.into_iter()),
            );
            let compiler = SpecCompiler::default();
            let spec = compiler.compile(&profile, DomainLexicon::builtin().general(), &Demographics::new());

            let expected: Vec<String> = compiler
                .rules()
                .rules()
                .iter()
                .filter(|r| r.condition.evaluate(&profile))
                .map(|r| r.id.as_str().to_string())
                .collect();
            prop_assert_eq!(&spec.applied_rules, &expected);
            for rule in compiler.rules().rules() {
                prop_assert_eq!(spec.text.contains(&rule.instruction), spec.applied(rule.id.as_str()));
            }
        }
    }
}
