//! Score normalizer
//!
//! Maps a Likert score in 1..=5 onto [-1, 1]: `(score - 3) / 2`, negated for
//! reversed items, rounded to 2 decimals (half away from zero).

use persona_core::{round2, ItemCatalog, PersonaResult, RawResponseSet, ResponseError};
use std::collections::BTreeMap;

/// Item id -> normalized value.
pub type NormalizedScores = BTreeMap<String, f64>;

/// Normalize one score.
pub fn normalize(score: i64, reversed: bool) -> PersonaResult<f64> {
    normalize_scoped(score, reversed, None)
}

fn normalize_scoped(score: i64, reversed: bool, item_id: Option<&str>) -> PersonaResult<f64> {
    if !(1..=5).contains(&score) {
        return Err(ResponseError::OutOfRange {
            item_id: item_id.map(str::to_string),
            value: score,
        }
        .into());
    }

    let value = (score - 3) as f64 / 2.0;
    let value = if reversed { -value } else { value };
    Ok(round2(value))
}

/// Normalize a complete response set against the catalog.
///
/// Errors, in the order they are checked:
/// - `UnknownItem` for an id the catalog does not define
/// - `MissingItem` for a catalog id without an answer
/// - `OutOfRange` for a score outside 1..=5
pub fn normalize_all(responses: &RawResponseSet, catalog: &ItemCatalog) -> PersonaResult<NormalizedScores> {
    if let Some(unknown) = responses.answers.keys().find(|id| !catalog.contains(id)) {
        return Err(ResponseError::UnknownItem {
            item_id: unknown.clone(),
        }
        .into());
    }

    let mut normalized = NormalizedScores::new();
    for item in catalog.items() {
        let score = responses.get(&item.id).ok_or_else(|| ResponseError::MissingItem {
            item_id: item.id.clone(),
        })?;
        let value = normalize_scoped(score, item.reversed, Some(&item.id))?;
        normalized.insert(item.id.clone(), value);
    }

    tracing::debug!(items = normalized.len(), "Normalized response set");
    Ok(normalized)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::PersonaError;
    use proptest::prelude::*;

    fn full_responses(score: i64) -> RawResponseSet {
        let catalog = ItemCatalog::standard();
        RawResponseSet::from_pairs(catalog.items().iter().map(|item| (item.id.clone(), score)))
    }

    #[test]
    fn test_normalize_exact_values() {
        assert_eq!(normalize(1, false).unwrap(), -1.0);
        assert_eq!(normalize(2, false).unwrap(), -0.5);
        assert_eq!(normalize(3, false).unwrap(), 0.0);
        assert_eq!(normalize(4, false).unwrap(), 0.5);
        assert_eq!(normalize(5, false).unwrap(), 1.0);
    }

    #[test]
    fn test_normalize_reversed_flips_sign() {
        assert_eq!(normalize(1, true).unwrap(), 1.0);
        assert_eq!(normalize(4, true).unwrap(), -0.5);
        assert_eq!(normalize(5, true).unwrap(), -1.0);
    }

    #[test]
    fn test_normalize_out_of_range() {
        for bad in [0, 6, -3, 100] {
            let err = normalize(bad, false).unwrap_err();
            assert!(matches!(
                err,
                PersonaError::Response(ResponseError::OutOfRange { item_id: None, value }) if value == bad
            ));
        }
    }

    #[test]
    fn test_normalize_all_complete_set() {
        let catalog = ItemCatalog::standard();
        let normalized = normalize_all(&full_responses(5), &catalog).unwrap();
        assert_eq!(normalized.len(), 28);
        assert_eq!(normalized["A1"], 1.0);
        assert_eq!(normalized["A2"], -1.0);
    }

    #[test]
    fn test_normalize_all_missing_item() {
        let catalog = ItemCatalog::standard();
        let mut responses = full_responses(3);
        responses.answers.remove("C4");
        let err = normalize_all(&responses, &catalog).unwrap_err();
        assert_eq!(
            err,
            PersonaError::Response(ResponseError::MissingItem {
                item_id: "C4".to_string()
            })
        );
    }

    #[test]
    fn test_normalize_all_unknown_item() {
        let catalog = ItemCatalog::standard();
        let mut responses = full_responses(3);
        responses.answers.insert("Z9".to_string(), 3);
        let err = normalize_all(&responses, &catalog).unwrap_err();
        assert!(matches!(
            err,
            PersonaError::Response(ResponseError::UnknownItem { ref item_id }) if item_id == "Z9"
        ));
    }

    #[test]
    fn test_normalize_all_out_of_range_names_item() {
        let catalog = ItemCatalog::standard();
        let mut responses = full_responses(3);
        responses.answers.insert("B5".to_string(), 9);
        let err = normalize_all(&responses, &catalog).unwrap_err();
        assert_eq!(
            err,
            PersonaError::Response(ResponseError::OutOfRange {
                item_id: Some("B5".to_string()),
                value: 9
            })
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// normalize(s, false) == (s - 3) / 2 exactly and reversal negates it.
        #[test]
        fn prop_normalize_formula(score in 1i64..=5) {
            let forward = normalize(score, false).unwrap();
            let reversed = normalize(score, true).unwrap();
            prop_assert_eq!(forward, (score - 3) as f64 / 2.0);
            prop_assert_eq!(reversed, -forward);
            prop_assert!((-1.0..=1.0).contains(&forward));
        }

        /// Every score outside 1..=5 is rejected.
        #[test]
        fn prop_normalize_rejects_out_of_range(score in prop_oneof![i64::MIN..1, 6i64..i64::MAX]) {
            prop_assert!(normalize(score, false).is_err());
            prop_assert!(normalize(score, true).is_err());
        }
    }
}
