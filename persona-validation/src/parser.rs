//! Self-assessment parser
//!
//! Generators answer the questionnaire in free text. Accepted shapes, tried
//! in order:
//! - a JSON object `{"A1": 4, ...}`, bare, inside a code fence, or embedded in prose
//! - one `ID: score` (or `ID = score`, `ID - score`) pair per line
//!
//! Anything else, or an answer sheet that skips catalog items, is a
//! `ParseFailure`. Range checks are left to the normalizer.

use persona_core::{ItemCatalog, LlmError, RawResponseSet};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn line_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r#"(?m)^\s*(?:[-*]\s*)?["'`]?([A-Za-z]{1,3}\d{1,3})["'`]?\s*[:=\-]\s*(-?\d+)\b"#).ok()
        })
        .as_ref()
}

/// Extract raw answers for every catalog item from generator output.
pub fn parse_self_assessment(output: &str, catalog: &ItemCatalog) -> Result<RawResponseSet, LlmError> {
    let mut answers = match json_answers(output, catalog) {
        Some(answers) => answers?,
        None => line_answers(output),
    };

    let before = answers.len();
    answers.answers.retain(|id, _| catalog.contains(id));
    if answers.len() < before {
        tracing::warn!(
            dropped = before - answers.len(),
            "Self-assessment contains ids outside the questionnaire"
        );
    }

    if answers.answers.is_empty() {
        return Err(LlmError::ParseFailure {
            reason: "no item scores found in self-assessment".to_string(),
        });
    }

    let missing: Vec<&str> = catalog
        .items()
        .iter()
        .map(|item| item.id.as_str())
        .filter(|id| answers.get(id).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(LlmError::ParseFailure {
            reason: format!("self-assessment skipped items {}", missing.join(", ")),
        });
    }

    Ok(answers)
}

/// `None` when the text holds no JSON object at all.
///
/// Keys outside the catalog are dropped before any score is decoded, so only
/// catalog items can fail with a type error.
fn json_answers(output: &str, catalog: &ItemCatalog) -> Option<Result<RawResponseSet, LlmError>> {
    let start = output.find('{')?;
    let end = output.rfind('}')?;
    if end <= start {
        return None;
    }

    let value: serde_json::Value = serde_json::from_str(&output[start..=end]).ok()?;
    // Accept `{"answers": {...}}` as well as the flat object.
    let value = match value.get("answers") {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => value,
    };
    let object = value.as_object()?;

    let mut known = serde_json::Map::new();
    for (key, raw) in object {
        let id = key.trim().to_ascii_uppercase();
        if catalog.contains(&id) {
            known.entry(id).or_insert_with(|| raw.clone());
        }
    }
    if known.len() < object.len() {
        tracing::warn!(
            dropped = object.len() - known.len(),
            "Self-assessment contains ids outside the questionnaire"
        );
    }

    Some(
        RawResponseSet::from_json(&serde_json::Value::Object(known))
            .map_err(|e| LlmError::ParseFailure { reason: e.to_string() }),
    )
}

fn line_answers(output: &str) -> RawResponseSet {
    let mut answers = BTreeMap::new();
    let Some(pattern) = line_pattern() else {
        return RawResponseSet { answers };
    };
    for captures in pattern.captures_iter(output) {
        let id = captures[1].to_ascii_uppercase();
        if let Ok(score) = captures[2].parse::<i64>() {
            // First answer for an id wins.
            answers.entry(id).or_insert(score);
        }
    }
    RawResponseSet { answers }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn full_json(score: i64) -> String {
        let catalog = ItemCatalog::standard();
        let body: Vec<String> = catalog
            .items()
            .iter()
            .map(|i| format!("\"{}\": {}", i.id, score))
            .collect();
        format!("{{{}}}", body.join(", "))
    }

    fn full_lines(score: i64) -> String {
        let catalog = ItemCatalog::standard();
        catalog
            .items()
            .iter()
            .map(|i| format!("{}: {}", i.id, score))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_bare_json() {
        let catalog = ItemCatalog::standard();
        let set = parse_self_assessment(&full_json(4), &catalog).unwrap();
        assert_eq!(set.len(), 28);
        assert_eq!(set.get("D6"), Some(4));
    }

    #[test]
    fn test_fenced_json_in_prose() {
        let catalog = ItemCatalog::standard();
        let output = format!(
            "Sure, here are my answers:\n```json\n{}\n```\nLet me know if you need more.",
            full_json(2)
        );
        let set = parse_self_assessment(&output, &catalog).unwrap();
        assert_eq!(set.get("A1"), Some(2));
    }

    #[test]
    fn test_line_format() {
        let catalog = ItemCatalog::standard();
        let output = format!("My answers:\n{}\n", full_lines(5).replace("B2:", "- b2 ="));
        let set = parse_self_assessment(&output, &catalog).unwrap();
        assert_eq!(set.len(), 28);
        assert_eq!(set.get("B2"), Some(5));
    }

    #[test]
    fn test_lowercase_json_keys() {
        let catalog = ItemCatalog::standard();
        let set = parse_self_assessment(&full_json(3).to_lowercase(), &catalog).unwrap();
        assert_eq!(set.get("C3"), Some(3));
    }

    #[test]
    fn test_wrapped_answers_and_stray_ids() {
        let catalog = ItemCatalog::standard();
        let output = format!("{{\"answers\": {}}}", full_json(4).replacen('{', "{\"Z9\": 1, ", 1));
        let set = parse_self_assessment(&output, &catalog).unwrap();
        assert_eq!(set.len(), 28);
        assert_eq!(set.get("Z9"), None);
    }

    #[test]
    fn test_extra_non_numeric_field_is_ignored() {
        let catalog = ItemCatalog::standard();
        let output = full_json(4).replacen('{', "{\"confidence\": \"high\", ", 1);
        let set = parse_self_assessment(&output, &catalog).unwrap();
        assert_eq!(set.len(), 28);
        assert!(set.answers.values().all(|score| *score == 4));
    }

    #[test]
    fn test_out_of_range_passes_through() {
        let catalog = ItemCatalog::standard();
        let set = parse_self_assessment(&full_lines(9), &catalog).unwrap();
        assert_eq!(set.get("A1"), Some(9));
    }

    #[test]
    fn test_prose_is_parse_failure() {
        let catalog = ItemCatalog::standard();
        let err = parse_self_assessment("I'd rather not answer that.", &catalog).unwrap_err();
        assert!(matches!(err, LlmError::ParseFailure { .. }));
    }

    #[test]
    fn test_incomplete_sheet_is_parse_failure() {
        let catalog = ItemCatalog::standard();
        let err = parse_self_assessment("A1: 4\nA2: 2\n", &catalog).unwrap_err();
        match err {
            LlmError::ParseFailure { reason } => assert!(reason.contains("A3")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_non_integer_json_is_parse_failure() {
        let catalog = ItemCatalog::standard();
        let output = full_json(4).replace("\"A1\": 4", "\"A1\": \"often\"");
        assert!(matches!(
            parse_self_assessment(&output, &catalog),
            Err(LlmError::ParseFailure { .. })
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Arbitrary text never panics the parser.
        #[test]
        fn prop_never_panics(text in ".{0,400}") {
            let _ = parse_self_assessment(&text, &ItemCatalog::standard());
        }

        /// Scores written as lines are recovered exactly.
        #[test]
        fn prop_lines_recovered(scores in prop::collection::vec(1i64..=5, 28)) {
            let catalog = ItemCatalog::standard();
            let text: String = catalog
                .items()
                .iter()
                .zip(scores.iter())
                .map(|(item, s)| format!("{}: {}\n", item.id, s))
                .collect();
            let set = parse_self_assessment(&text, &catalog).unwrap();
            for (item, s) in catalog.items().iter().zip(scores.iter()) {
                prop_assert_eq!(set.get(&item.id), Some(*s));
            }
        }
    }
}
