//! PERSONA Test Utilities
//!
//! Centralized test infrastructure for the PERSONA workspace:
//! - Proptest generators for responses and profiles
//! - Fixtures for common survey scenarios
//! - Re-export of the scripted random source for exact clustering tests
//! - Custom assertions for profile and validation checks

// Re-export core types for convenience
pub use persona_core::{
    ClusterSettings, Demographics, DomainLexicon, ItemCatalog, PersonaError, PersonaResult,
    PipelineConfig, ProfileVector, RawResponseSet, RespondentRecord, TraitDimension,
    ValidationResult,
};
pub use persona_llm::{EchoGenerator, ScriptedGenerator};

pub use persona_cluster::ScriptedSource;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;

    /// A complete, in-range response set for the standard catalog.
    pub fn arb_responses() -> impl Strategy<Value = RawResponseSet> {
        prop::collection::vec(1i64..=5, 28).prop_map(|scores| {
            let catalog = ItemCatalog::standard();
            RawResponseSet::from_pairs(
                catalog
                    .items()
                    .iter()
                    .zip(scores)
                    .map(|(item, score)| (item.id.clone(), score)),
            )
        })
    }

    /// A score outside 1..=5.
    pub fn arb_out_of_range_score() -> impl Strategy<Value = i64> {
        prop_oneof![-100i64..1, 6i64..100]
    }

    /// A 14-dimension profile with values on the 0.01 grid in [-1, 1].
    pub fn arb_profile() -> impl Strategy<Value = ProfileVector> {
        prop::collection::vec(-100i32..=100, 14).prop_map(|cents| {
            ProfileVector::from_pairs(
                TraitDimension::ALL
                    .iter()
                    .zip(cents)
                    .map(|(dim, c)| (dim.as_str(), c as f64 / 100.0)),
            )
        })
    }

    /// Respondents with standard-catalog profiles.
    pub fn arb_respondents(max: usize) -> impl Strategy<Value = Vec<RespondentRecord>> {
        prop::collection::vec(arb_profile(), 0..=max).prop_map(|profiles| {
            profiles
                .into_iter()
                .enumerate()
                .map(|(i, profile)| RespondentRecord::new(format!("r{}", i), profile))
                .collect()
        })
    }

    pub fn arb_domain_name() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("general".to_string()),
            Just("engineering".to_string()),
            Just("eng".to_string()),
            Just("legal".to_string()),
            Just("executive".to_string()),
            Just("hr".to_string()),
            Just("sales".to_string()),
            Just("finance".to_string()),
            "[a-z]{3,10}",
        ]
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    use super::*;

    /// Every item answered with the same score.
    pub fn uniform_responses(score: i64) -> RawResponseSet {
        let catalog = ItemCatalog::standard();
        RawResponseSet::from_pairs(catalog.items().iter().map(|item| (item.id.clone(), score)))
    }

    /// Answers that push every trait to `value_for(trait)` (-1, 0 or 1 per sign).
    pub fn responses_for(value_for: impl Fn(TraitDimension) -> i8) -> RawResponseSet {
        let catalog = ItemCatalog::standard();
        RawResponseSet::from_pairs(catalog.items().iter().map(|item| {
            let target = TraitDimension::from_str(&item.trait_name)
                .map(&value_for)
                .unwrap_or(0)
                .signum() as i64;
            let direction = if item.reversed { -target } else { target };
            (item.id.clone(), 3 + 2 * direction)
        }))
    }

    /// Blunt, contrarian, meticulous engineer: agreeableness -1, directness 1,
    /// deference -1, diligence 1.
    pub fn hostile_engineer_responses() -> RawResponseSet {
        RawResponseSet::from_pairs([
            ("A1", 5), ("A2", 1), ("A3", 5), ("A4", 1),
            ("A5", 1), ("A6", 5), ("A7", 1), ("A8", 5),
            ("B1", 5), ("B2", 1), ("B3", 5), ("B4", 1),
            ("B5", 5), ("B6", 1), ("B7", 5), ("B8", 1),
            ("C1", 1), ("C2", 5), ("C3", 1), ("C4", 5),
            ("C5", 1), ("C6", 5), ("D1", 5), ("D2", 1),
            ("D3", 5), ("D4", 1), ("D5", 5), ("D6", 1),
        ])
    }

    pub fn engineer_demographics() -> Demographics {
        [
            ("name", "Riley"),
            ("role", "Principal Engineer"),
            ("department", "Infrastructure"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    /// Ten respondents in three well separated groups (4, 3, 3).
    pub fn three_archetype_population() -> Vec<RespondentRecord> {
        let groups: [(f64, &str, usize); 3] = [(-0.8, "support", 4), (0.0, "operations", 3), (0.8, "engineering", 3)];
        let mut respondents = Vec::new();
        for (center, department, count) in groups {
            for i in 0..count {
                let jitter = i as f64 * 0.02;
                let profile = ProfileVector::from_pairs(
                    TraitDimension::ALL
                        .iter()
                        .map(|dim| (dim.as_str(), center + jitter)),
                );
                let demographics: Demographics = [("department".to_string(), department.to_string())]
                    .into_iter()
                    .collect();
                respondents.push(
                    RespondentRecord::new(format!("{}-{}", department, i), profile)
                        .with_demographics(demographics),
                );
            }
        }
        respondents
    }

    /// JSON self-assessment that reproduces `responses` exactly.
    pub fn self_assessment_json(responses: &RawResponseSet) -> String {
        serde_json::to_string(&responses.answers).unwrap_or_default()
    }

    /// Scripted generator whose self-assessment mirrors `responses`.
    pub fn mirroring_generator(responses: &RawResponseSet) -> ScriptedGenerator {
        ScriptedGenerator::new("mirror").with_self_assessment(self_assessment_json(responses))
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    use super::*;

    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &PersonaResult<T>) {
        assert!(result.is_ok(), "expected Ok, got {:?}", result);
    }

    #[track_caller]
    pub fn assert_err<T: std::fmt::Debug>(result: &PersonaResult<T>) {
        assert!(result.is_err(), "expected Err, got {:?}", result);
    }

    /// Every trait value lies in [-1, 1].
    #[track_caller]
    pub fn assert_profile_in_range(profile: &ProfileVector) {
        for (name, value) in &profile.traits {
            assert!(
                (-1.0..=1.0).contains(value),
                "trait {} out of range: {}",
                name,
                value
            );
        }
    }

    /// Every value is a multiple of 0.01.
    #[track_caller]
    pub fn assert_two_decimals(profile: &ProfileVector) {
        for (name, value) in &profile.traits {
            let scaled = value * 100.0;
            assert!(
                (scaled - scaled.round()).abs() < 1e-9,
                "trait {} not rounded to 2 decimals: {}",
                name,
                value
            );
        }
    }

    /// Profile carries exactly the 14 standard trait keys.
    #[track_caller]
    pub fn assert_standard_keys(profile: &ProfileVector) {
        let expected: Vec<String> = TraitDimension::ALL.iter().map(|d| d.as_str().to_string()).collect();
        assert_eq!(profile.keys(), expected);
    }

    #[track_caller]
    pub fn assert_trait_at_most(profile: &ProfileVector, name: &str, bound: f64) {
        let value = profile.get(name).unwrap_or_else(|| panic!("missing trait {}", name));
        assert!(value <= bound, "{} = {} exceeds {}", name, value, bound);
    }

    #[track_caller]
    pub fn assert_trait_at_least(profile: &ProfileVector, name: &str, bound: f64) {
        let value = profile.get(name).unwrap_or_else(|| panic!("missing trait {}", name));
        assert!(value >= bound, "{} = {} below {}", name, value, bound);
    }

    #[track_caller]
    pub fn assert_passed(result: &ValidationResult) {
        assert!(
            result.passed,
            "validation failed: correlation {} < threshold {}",
            result.correlation,
            result.threshold
        );
    }
}

#[cfg(test)]
mod tests {
    use super::assertions::*;
    use super::fixtures::*;
    use super::*;
    use persona_profile::build_profile;

    #[test]
    fn test_hostile_engineer_fixture_is_complete() {
        let responses = hostile_engineer_responses();
        assert_eq!(responses.len(), 28);
        let profile = build_profile(&responses, &ItemCatalog::standard()).unwrap();
        assert_trait_at_most(&profile, "agreeableness", -0.5);
        assert_trait_at_least(&profile, "directness", 0.7);
    }

    #[test]
    fn test_responses_for_hits_targets() {
        let responses = responses_for(|dim| match dim {
            TraitDimension::Humor => 1,
            TraitDimension::Patience => -1,
            _ => 0,
        });
        let profile = build_profile(&responses, &ItemCatalog::standard()).unwrap();
        assert_eq!(profile.get("humor"), Some(1.0));
        assert_eq!(profile.get("patience"), Some(-1.0));
        assert_eq!(profile.get("formality"), Some(0.0));
    }

    #[test]
    fn test_population_shape() {
        let population = three_archetype_population();
        assert_eq!(population.len(), 10);
        for respondent in &population {
            assert_standard_keys(&respondent.profile);
            assert_profile_in_range(&respondent.profile);
        }
    }
}
