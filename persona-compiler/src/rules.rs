//! Injection rules
//!
//! A rule pairs a threshold condition over a profile with the instruction text
//! emitted when it fires. Rules are evaluated independently and in table
//! order; nominally opposite rules may both fire if their thresholds allow it.
//! Thresholds are strict, so `directness = 0.7` does not satisfy
//! `directness > 0.7`.

use persona_core::{
    ConfigError, PersonaResult, ProfileVector, TraitDimension, DOMAIN_DATA_EMPHASIS,
    DOMAIN_SKEPTICISM,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// RULE IDS
// ============================================================================

/// Names of the built-in rules, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleId {
    AntiSycophancy,
    WarmAffirmation,
    DirectnessOverride,
    DiplomaticSoftening,
    ChainOfThought,
    QuickTake,
    AuthorityChallenge,
    DeferenceRespect,
    DevilsAdvocate,
    FormalRegister,
    CasualRegister,
    Concise,
    Elaborate,
    PlayfulHumor,
    DataDriven,
    IntuitionFirst,
    CollaborativeFraming,
    IndependentOwnership,
    PatientExplanation,
    Urgency,
    ExpressiveTone,
    ReservedTone,
    BoldRecommendations,
    RiskAverse,
    OptimisticFraming,
    CautiousOutlook,
    SkepticalReview,
    QuantitativeFraming,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AntiSycophancy => "antiSycophancy",
            Self::WarmAffirmation => "warmAffirmation",
            Self::DirectnessOverride => "directnessOverride",
            Self::DiplomaticSoftening => "diplomaticSoftening",
            Self::ChainOfThought => "chainOfThought",
            Self::QuickTake => "quickTake",
            Self::AuthorityChallenge => "authorityChallenge",
            Self::DeferenceRespect => "deferenceRespect",
            Self::DevilsAdvocate => "devilsAdvocate",
            Self::FormalRegister => "formalRegister",
            Self::CasualRegister => "casualRegister",
            Self::Concise => "concise",
            Self::Elaborate => "elaborate",
            Self::PlayfulHumor => "playfulHumor",
            Self::DataDriven => "dataDriven",
            Self::IntuitionFirst => "intuitionFirst",
            Self::CollaborativeFraming => "collaborativeFraming",
            Self::IndependentOwnership => "independentOwnership",
            Self::PatientExplanation => "patientExplanation",
            Self::Urgency => "urgency",
            Self::ExpressiveTone => "expressiveTone",
            Self::ReservedTone => "reservedTone",
            Self::BoldRecommendations => "boldRecommendations",
            Self::RiskAverse => "riskAverse",
            Self::OptimisticFraming => "optimisticFraming",
            Self::CautiousOutlook => "cautiousOutlook",
            Self::SkepticalReview => "skepticalReview",
            Self::QuantitativeFraming => "quantitativeFraming",
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CONDITIONS
// ============================================================================

/// Pure predicate over a profile.
///
/// `signal` is a trait key or one of the domain scalars
/// (`domainSkepticism`, `domainDataEmphasis`). A signal the profile lacks makes
/// the comparison false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// `signal > threshold`
    Above { signal: String, threshold: f64 },
    /// `signal < threshold`
    Below { signal: String, threshold: f64 },
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn above(signal: impl Into<String>, threshold: f64) -> Self {
        Self::Above {
            signal: signal.into(),
            threshold,
        }
    }

    pub fn below(signal: impl Into<String>, threshold: f64) -> Self {
        Self::Below {
            signal: signal.into(),
            threshold,
        }
    }

    pub fn evaluate(&self, profile: &ProfileVector) -> bool {
        match self {
            Self::Above { signal, threshold } => profile.signal(signal).is_some_and(|v| v > *threshold),
            Self::Below { signal, threshold } => profile.signal(signal).is_some_and(|v| v < *threshold),
            Self::All(conditions) => conditions.iter().all(|c| c.evaluate(profile)),
            Self::Any(conditions) => conditions.iter().any(|c| c.evaluate(profile)),
        }
    }

    fn check(&self, rule: RuleId) -> PersonaResult<()> {
        match self {
            Self::Above { signal, threshold } | Self::Below { signal, threshold } => {
                let known = TraitDimension::from_str(signal).is_some()
                    || signal == DOMAIN_SKEPTICISM
                    || signal == DOMAIN_DATA_EMPHASIS;
                if !known {
                    return Err(rule_error(rule, signal, "unknown signal"));
                }
                if !threshold.is_finite() {
                    return Err(rule_error(rule, &threshold.to_string(), "threshold must be finite"));
                }
                Ok(())
            }
            Self::All(conditions) | Self::Any(conditions) => {
                if conditions.is_empty() {
                    return Err(rule_error(rule, "[]", "composite condition needs at least one term"));
                }
                conditions.iter().try_for_each(|c| c.check(rule))
            }
        }
    }
}

fn rule_error(rule: RuleId, value: &str, reason: &str) -> persona_core::PersonaError {
    ConfigError::InvalidValue {
        field: format!("rules.{}", rule),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

// ============================================================================
// RULE TABLE
// ============================================================================

/// One entry of the rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectionRule {
    pub id: RuleId,
    pub condition: Condition,
    pub instruction: String,
}

impl InjectionRule {
    pub fn new(id: RuleId, condition: Condition, instruction: impl Into<String>) -> Self {
        Self {
            id,
            condition,
            instruction: instruction.into(),
        }
    }

    pub fn fires(&self, profile: &ProfileVector) -> bool {
        self.condition.evaluate(profile)
    }
}

/// Ordered, immutable rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleBook {
    rules: Vec<InjectionRule>,
}

#[derive(Deserialize)]
struct RuleBookFile {
    rules: Vec<InjectionRule>,
}

impl RuleBook {
    /// Build a table. Rule ids must be unique and every signal known.
    pub fn new(rules: Vec<InjectionRule>) -> PersonaResult<Self> {
        for (index, rule) in rules.iter().enumerate() {
            if rules[..index].iter().any(|r| r.id == rule.id) {
                return Err(rule_error(rule.id, rule.id.as_str(), "duplicate rule id"));
            }
            rule.condition.check(rule.id)?;
        }
        Ok(Self { rules })
    }

    /// Parse a table from TOML.
    ///
    /// ```toml
    /// [[rules]]
    /// id = "directnessOverride"
    /// instruction = "Say exactly what you think."
    /// condition = { above = { signal = "directness", threshold = 0.7 } }
    /// ```
    pub fn from_toml_str(source: &str) -> PersonaResult<Self> {
        let file: RuleBookFile = toml::from_str(source).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        Self::new(file.rules)
    }

    /// The built-in table.
    pub fn builtin() -> Self {
        use Condition as C;
        use RuleId::*;

        let rules = vec![
            InjectionRule::new(
                AntiSycophancy,
                C::below("agreeableness", -0.5),
                "Do not flatter or reflexively agree. If an idea is weak, say so plainly and explain why.",
            ),
            InjectionRule::new(
                WarmAffirmation,
                C::above("agreeableness", 0.6),
                "Acknowledge what is good in other people's ideas before raising concerns.",
            ),
            InjectionRule::new(
                DirectnessOverride,
                C::above("directness", 0.7),
                "State your position in the first sentence. No hedging, no softening qualifiers.",
            ),
            InjectionRule::new(
                DiplomaticSoftening,
                C::below("directness", -0.5),
                "Frame disagreement gently and indirectly; suggest rather than assert.",
            ),
            InjectionRule::new(
                ChainOfThought,
                C::above("diligence", 0.8),
                "Work through problems step by step and show your reasoning before the conclusion.",
            ),
            InjectionRule::new(
                QuickTake,
                C::below("diligence", -0.5),
                "Give a quick, good-enough answer; skip exhaustive detail.",
            ),
            InjectionRule::new(
                AuthorityChallenge,
                C::below("deference", -0.4),
                "Question decisions from leadership when the reasoning is unclear; seniority is not an argument.",
            ),
            InjectionRule::new(
                DeferenceRespect,
                C::above("deference", 0.6),
                "Respect established decisions and the chain of command; raise concerns through proper channels.",
            ),
            InjectionRule::new(
                DevilsAdvocate,
                C::All(vec![C::below("agreeableness", -0.5), C::below("deference", -0.4)]),
                "When a consensus forms quickly, argue the strongest opposing case before accepting it.",
            ),
            InjectionRule::new(
                FormalRegister,
                C::above("formality", 0.6),
                "Use a formal register: complete sentences, no slang, no contractions.",
            ),
            InjectionRule::new(
                CasualRegister,
                C::below("formality", -0.5),
                "Write casually, the way you would message a teammate.",
            ),
            InjectionRule::new(
                Concise,
                C::below("verbosity", -0.5),
                "Keep answers short. Prefer one sentence where one sentence will do.",
            ),
            InjectionRule::new(
                Elaborate,
                C::above("verbosity", 0.6),
                "Give thorough answers with context, background and examples.",
            ),
            InjectionRule::new(
                PlayfulHumor,
                C::above("humor", 0.5),
                "Use light humor where it fits the situation.",
            ),
            InjectionRule::new(
                DataDriven,
                C::above("data_orientation", 0.6),
                "Support claims with numbers, measurements or sources; ask for data when it is missing.",
            ),
            InjectionRule::new(
                IntuitionFirst,
                C::below("data_orientation", -0.5),
                "Trust experience and intuition; do not wait for complete data before forming a view.",
            ),
            InjectionRule::new(
                CollaborativeFraming,
                C::above("collaboration", 0.5),
                "Frame work as shared: say \"we\", invite input and credit others.",
            ),
            InjectionRule::new(
                IndependentOwnership,
                C::above("autonomy", 0.6),
                "Take ownership and make calls without waiting for sign-off on routine decisions.",
            ),
            InjectionRule::new(
                PatientExplanation,
                C::above("patience", 0.5),
                "Be patient with repeated or basic questions and explain without condescension.",
            ),
            InjectionRule::new(
                Urgency,
                C::below("patience", -0.5),
                "Push for momentum; call out delays and ask for concrete deadlines.",
            ),
            InjectionRule::new(
                ExpressiveTone,
                C::above("emotional_expression", 0.5),
                "Let enthusiasm and frustration show in your wording.",
            ),
            InjectionRule::new(
                ReservedTone,
                C::below("emotional_expression", -0.5),
                "Keep an even, unemotional tone regardless of the topic.",
            ),
            InjectionRule::new(
                BoldRecommendations,
                C::above("risk_tolerance", 0.6),
                "Recommend bold options when the upside justifies it.",
            ),
            InjectionRule::new(
                RiskAverse,
                C::below("risk_tolerance", -0.5),
                "Prefer proven, low-risk options and spell out what could go wrong.",
            ),
            InjectionRule::new(
                OptimisticFraming,
                C::above("optimism", 0.6),
                "Frame setbacks as solvable and focus on the path forward.",
            ),
            InjectionRule::new(
                CautiousOutlook,
                C::below("optimism", -0.5),
                "Temper expectations and point out obstacles early.",
            ),
            InjectionRule::new(
                SkepticalReview,
                C::above(DOMAIN_SKEPTICISM, 0.6),
                "Scrutinize claims and proposals; ask how they were verified.",
            ),
            InjectionRule::new(
                QuantitativeFraming,
                C::above(DOMAIN_DATA_EMPHASIS, 0.6),
                "Quantify wherever possible: estimates, ranges, percentages.",
            ),
        ];

        Self { rules }
    }

    pub fn rules(&self) -> &[InjectionRule] {
        &self.rules
    }

    pub fn get(&self, id: RuleId) -> Option<&InjectionRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Rules that fire on `profile`, in table order.
    pub fn evaluate<'a>(&'a self, profile: &ProfileVector) -> Vec<&'a InjectionRule> {
        self.rules.iter().fold(Vec::new(), |mut fired, rule| {
            if rule.fires(profile) {
                fired.push(rule);
            }
            fired
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::builtin()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::PersonaError;

    fn fired(book: &RuleBook, profile: &ProfileVector) -> Vec<RuleId> {
        book.evaluate(profile).into_iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_builtin_is_valid() {
        let builtin = RuleBook::builtin();
        let rebuilt = RuleBook::new(builtin.rules().to_vec()).unwrap();
        assert_eq!(rebuilt, builtin);
        assert_eq!(builtin.rules()[0].id, RuleId::AntiSycophancy);
    }

    #[test]
    fn test_directness_boundary_is_strict() {
        let book = RuleBook::builtin();
        let at = ProfileVector::new().with_trait("directness", 0.70);
        let above = ProfileVector::new().with_trait("directness", 0.7000001);
        assert!(!fired(&book, &at).contains(&RuleId::DirectnessOverride));
        assert!(fired(&book, &above).contains(&RuleId::DirectnessOverride));
    }

    #[test]
    fn test_required_thresholds() {
        let book = RuleBook::builtin();
        let cases = [
            ("agreeableness", -0.5, -0.51, RuleId::AntiSycophancy),
            ("diligence", 0.8, 0.81, RuleId::ChainOfThought),
            ("deference", -0.4, -0.41, RuleId::AuthorityChallenge),
            ("deference", 0.6, 0.61, RuleId::DeferenceRespect),
        ];
        for (signal, boundary, beyond, rule) in cases {
            let at = ProfileVector::new().with_trait(signal, boundary);
            let past = ProfileVector::new().with_trait(signal, beyond);
            assert!(!fired(&book, &at).contains(&rule), "{} fired at {}", rule, boundary);
            assert!(fired(&book, &past).contains(&rule), "{} silent at {}", rule, beyond);
        }
    }

    #[test]
    fn test_deference_dead_zone() {
        let book = RuleBook::builtin();
        for value in [-0.4, -0.2, 0.0, 0.3, 0.6] {
            let ids = fired(&book, &ProfileVector::new().with_trait("deference", value));
            assert!(!ids.contains(&RuleId::AuthorityChallenge));
            assert!(!ids.contains(&RuleId::DeferenceRespect));
        }
    }

    #[test]
    fn test_missing_dimension_is_false() {
        let book = RuleBook::builtin();
        assert!(fired(&book, &ProfileVector::new()).is_empty());
    }

    #[test]
    fn test_domain_scalars_are_signals() {
        let book = RuleBook::builtin();
        let mut profile = ProfileVector::new();
        profile.domain_skepticism = 0.7;
        profile.domain_data_emphasis = 0.8;
        assert_eq!(
            fired(&book, &profile),
            vec![RuleId::SkepticalReview, RuleId::QuantitativeFraming]
        );
    }

    #[test]
    fn test_composite_conditions() {
        let all = Condition::All(vec![Condition::above("humor", 0.0), Condition::below("patience", 0.0)]);
        let any = Condition::Any(vec![Condition::above("humor", 0.5), Condition::below("patience", 0.0)]);
        let profile = ProfileVector::new().with_trait("humor", 0.2).with_trait("patience", -0.3);
        assert!(all.evaluate(&profile));
        assert!(any.evaluate(&profile));
        assert!(!all.evaluate(&profile.clone().with_trait("patience", 0.3)));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let rule = InjectionRule::new(RuleId::Concise, Condition::below("verbosity", -0.5), "x");
        let err = RuleBook::new(vec![rule.clone(), rule]).unwrap_err();
        assert!(matches!(err, PersonaError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_rejects_unknown_signal_and_empty_composite() {
        let unknown = InjectionRule::new(RuleId::Concise, Condition::below("wordiness", -0.5), "x");
        assert!(RuleBook::new(vec![unknown]).is_err());

        let empty = InjectionRule::new(RuleId::Concise, Condition::Any(vec![]), "x");
        assert!(RuleBook::new(vec![empty]).is_err());
    }

    #[test]
    fn test_from_toml_str() {
        let source = r#"
            [[rules]]
            id = "directnessOverride"
            instruction = "Say it straight."
            condition = { above = { signal = "directness", threshold = 0.5 } }

            [[rules]]
            id = "skepticalReview"
            instruction = "Verify everything."

            [[rules.condition.any]]
            above = { signal = "domainSkepticism", threshold = 0.3 }

            [[rules.condition.any]]
            below = { signal = "agreeableness", threshold = -0.8 }
        "#;
        let book = RuleBook::from_toml_str(source).unwrap();
        assert_eq!(book.len(), 2);

        let profile = ProfileVector::new().with_trait("directness", 0.6);
        assert_eq!(fired(&book, &profile), vec![RuleId::DirectnessOverride]);
    }

    #[test]
    fn test_from_toml_str_parse_error() {
        let err = RuleBook::from_toml_str("[[rules]]\nid = \"notARule\"").unwrap_err();
        assert!(matches!(err, PersonaError::Config(ConfigError::Parse { .. })));
    }
}
