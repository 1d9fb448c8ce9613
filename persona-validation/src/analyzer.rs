//! Validation analyzer
//!
//! Compares an input profile with the profile re-derived from a generator's
//! self-reported answers to the same questionnaire.

use crate::stats::{cosine, mean_absolute_error, pearson_raw};
use persona_core::{
    key_set_diff, round_to, AdjustDirection, DimensionDiagnostic, ItemCatalog, PersonaResult,
    ProfileVector, RawResponseSet, RemediationHint, TraitDimension, ValidationResult,
    ValidationSettings, VectorError,
};
use persona_profile::build_profile;

/// Float noise allowed below the threshold, so a perfect match still
/// passes a threshold of 1.0.
const VERDICT_SLACK: f64 = 1e-9;

/// Validate `input` against raw self-assessment answers.
///
/// The answers go through the same normalizer and aggregator as survey
/// responses, so malformed answers fail with the usual response errors.
#[tracing::instrument(skip_all, fields(threshold = settings.threshold))]
pub fn validate(
    input: &ProfileVector,
    assessed_answers: &RawResponseSet,
    catalog: &ItemCatalog,
    settings: &ValidationSettings,
) -> PersonaResult<ValidationResult> {
    let assessed = build_profile(assessed_answers, catalog)?;
    compare(input, &assessed, settings)
}

/// Compare two already aggregated profiles.
///
/// Both profiles must carry the same trait keys, otherwise `KeySetMismatch`.
pub fn compare(
    input: &ProfileVector,
    assessed: &ProfileVector,
    settings: &ValidationSettings,
) -> PersonaResult<ValidationResult> {
    let (missing, unexpected) = key_set_diff(input, assessed);
    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(VectorError::KeySetMismatch { missing, unexpected }.into());
    }

    let xs = input.values();
    let ys = assessed.values();

    let raw_correlation = pearson_raw(&xs, &ys);
    let correlation = round_to(raw_correlation, 4);
    let cosine_similarity = cosine(&xs, &ys);
    let mae = mean_absolute_error(&xs, &ys);

    let mut per_dimension: Vec<DimensionDiagnostic> = input
        .traits
        .iter()
        .zip(ys.iter())
        .map(|((name, &input_value), &assessed_value)| {
            let difference = round_to((input_value - assessed_value).abs(), 4);
            DimensionDiagnostic {
                trait_name: name.clone(),
                input_value,
                assessed_value,
                difference,
                accurate: difference < settings.accuracy_tolerance,
            }
        })
        .collect();
    // Stable: equal differences stay in lexical order.
    per_dimension.sort_by(|a, b| b.difference.total_cmp(&a.difference));

    // The verdict uses the unrounded coefficient; only the report is rounded.
    let passed = raw_correlation + VERDICT_SLACK >= settings.threshold;
    let hints = if passed {
        Vec::new()
    } else {
        remediation_hints(&per_dimension, settings.max_hints)
    };

    if passed {
        tracing::info!(correlation, mae, "Self-assessment passed");
    } else {
        tracing::warn!(correlation, mae, hints = hints.len(), "Self-assessment below threshold");
    }

    Ok(ValidationResult {
        correlation,
        cosine_similarity,
        mean_absolute_error: mae,
        per_dimension,
        passed,
        threshold: settings.threshold,
        hints,
    })
}

/// Hints for the worst reproduced dimensions, worst first.
fn remediation_hints(per_dimension: &[DimensionDiagnostic], limit: usize) -> Vec<RemediationHint> {
    per_dimension
        .iter()
        .filter(|d| d.difference > 0.0)
        .take(limit)
        .map(|d| {
            let gap = round_to(d.input_value - d.assessed_value, 4);
            let direction = if gap > 0.0 {
                AdjustDirection::Increase
            } else {
                AdjustDirection::Decrease
            };
            let label = TraitDimension::from_str(&d.trait_name)
                .map(|t| t.label().to_string())
                .unwrap_or_else(|| d.trait_name.clone());
            RemediationHint {
                trait_name: d.trait_name.clone(),
                direction,
                gap,
                message: format!(
                    "{} instruction intensity for {}: target {:.2}, self-assessed {:.2}",
                    capitalize(direction.as_str()),
                    label,
                    d.input_value,
                    d.assessed_value
                ),
            }
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::{PersonaError, ResponseError};

    fn answers(score_for: impl Fn(&str) -> i64) -> RawResponseSet {
        let catalog = ItemCatalog::standard();
        RawResponseSet::from_pairs(catalog.items().iter().map(|i| (i.id.clone(), score_for(&i.id))))
    }

    fn varied() -> RawResponseSet {
        // Distinct scores per item so the resulting profile has variance.
        answers(|id| {
            let n: i64 = id[1..].parse().unwrap_or(1);
            ((n + id.as_bytes()[0] as i64) % 5) + 1
        })
    }

    #[test]
    fn test_self_validation_is_perfect() {
        let catalog = ItemCatalog::standard();
        let settings = ValidationSettings::default();
        let responses = varied();
        let input = build_profile(&responses, &catalog).unwrap();

        let result = validate(&input, &responses, &catalog, &settings).unwrap();
        assert_eq!(result.correlation, 1.0);
        assert_eq!(result.cosine_similarity, 1.0);
        assert_eq!(result.mean_absolute_error, 0.0);
        assert!(result.passed);
        assert!(result.hints.is_empty());
        assert_eq!(result.per_dimension.len(), 14);
        assert!(result.per_dimension.iter().all(|d| d.accurate && d.difference == 0.0));
    }

    #[test]
    fn test_zero_variance_assessment_fails() {
        let catalog = ItemCatalog::standard();
        let input = build_profile(&varied(), &catalog).unwrap();
        // All 3s normalize to 0 everywhere.
        let flat = answers(|_| 3);

        let result = validate(&input, &flat, &catalog, &ValidationSettings::default()).unwrap();
        assert_eq!(result.correlation, 0.0);
        assert_eq!(result.cosine_similarity, 0.0);
        assert!(!result.passed);
        assert!(!result.hints.is_empty());
        assert!(result.hints.len() <= 3);
    }

    #[test]
    fn test_per_dimension_sorted_and_hints_directional() {
        let settings = ValidationSettings::default();
        let input = ProfileVector::new()
            .with_trait("directness", 0.9)
            .with_trait("formality", -0.8)
            .with_trait("humor", 0.1);
        let assessed = ProfileVector::new()
            .with_trait("directness", 0.1)
            .with_trait("formality", 0.2)
            .with_trait("humor", 0.1);

        let result = compare(&input, &assessed, &settings).unwrap();
        let order: Vec<&str> = result.per_dimension.iter().map(|d| d.trait_name.as_str()).collect();
        assert_eq!(order, vec!["formality", "directness", "humor"]);
        assert!(!result.per_dimension[0].accurate);
        assert!(result.per_dimension[2].accurate);

        assert!(!result.passed);
        assert_eq!(result.hints.len(), 2);
        assert_eq!(result.hints[0].trait_name, "formality");
        assert_eq!(result.hints[0].direction, AdjustDirection::Decrease);
        assert_eq!(result.hints[0].gap, -1.0);
        assert_eq!(result.hints[1].direction, AdjustDirection::Increase);
        assert!(result.hints[1].message.starts_with("Increase instruction intensity for directness"));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let input = ProfileVector::new().with_trait("a", 1.0).with_trait("b", -1.0);
        let settings = ValidationSettings {
            threshold: 1.0,
            ..ValidationSettings::default()
        };
        assert!(compare(&input, &input, &settings).unwrap().passed);
    }

    #[test]
    fn test_verdict_uses_unrounded_correlation() {
        // Raw r is 0.79995..., which reports as 0.8.
        let input = ProfileVector::new()
            .with_trait("a", 1.0)
            .with_trait("b", -1.0)
            .with_trait("c", 0.5)
            .with_trait("d", 0.0);
        let assessed = ProfileVector::new()
            .with_trait("a", 0.9)
            .with_trait("b", -0.67)
            .with_trait("c", -0.38)
            .with_trait("d", 0.0);
        let settings = ValidationSettings {
            threshold: 0.8,
            ..ValidationSettings::default()
        };

        let result = compare(&input, &assessed, &settings).unwrap();
        assert_eq!(result.correlation, 0.8);
        assert!(!result.passed);
        assert!(!result.hints.is_empty());
    }

    #[test]
    fn test_key_set_mismatch() {
        let input = ProfileVector::new().with_trait("directness", 0.5).with_trait("humor", 0.1);
        let assessed = ProfileVector::new().with_trait("directness", 0.5).with_trait("wit", 0.1);
        let err = compare(&input, &assessed, &ValidationSettings::default()).unwrap_err();
        assert_eq!(
            err,
            PersonaError::Vector(VectorError::KeySetMismatch {
                missing: vec!["humor".to_string()],
                unexpected: vec!["wit".to_string()],
            })
        );
    }

    #[test]
    fn test_malformed_answers_are_response_errors() {
        let catalog = ItemCatalog::standard();
        let input = build_profile(&varied(), &catalog).unwrap();
        let mut bad = varied();
        bad.answers.insert("A1".to_string(), 7);
        let err = validate(&input, &bad, &catalog, &ValidationSettings::default()).unwrap_err();
        assert!(matches!(err, PersonaError::Response(ResponseError::OutOfRange { .. })));
    }
}
