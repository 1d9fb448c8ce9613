//! Survey item catalog
//!
//! 28 Likert items, two per trait dimension. In every pair one item is keyed
//! positively and one is reversed, so acquiescent answering cancels out.

use crate::{ConfigError, PersonaResult, TraitDimension};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One survey question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: String,
    pub trait_name: String,
    /// Agreement with the statement indicates the *low* end of the trait.
    pub reversed: bool,
    /// Statement shown to the respondent.
    pub prompt: String,
}

/// Question as handed to a self-assessing generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
}

const STANDARD_ITEMS: [(&str, TraitDimension, bool, &str); 28] = [
    ("A1", TraitDimension::Directness, false, "I say exactly what I think, even when it is uncomfortable."),
    ("A2", TraitDimension::Directness, true, "I soften criticism so that it does not sting."),
    ("A3", TraitDimension::Formality, false, "I keep workplace communication formal and professional."),
    ("A4", TraitDimension::Formality, true, "I write work messages the way I would talk to a friend."),
    ("A5", TraitDimension::Verbosity, false, "I give thorough, detailed explanations."),
    ("A6", TraitDimension::Verbosity, true, "I keep my messages as short as possible."),
    ("A7", TraitDimension::Humor, false, "I use humor to lighten discussions at work."),
    ("A8", TraitDimension::Humor, true, "I keep jokes out of professional conversations."),
    ("B1", TraitDimension::Agreeableness, true, "I point out flaws in ideas even when others are enthusiastic."),
    ("B2", TraitDimension::Agreeableness, false, "I go along with the group to keep the peace."),
    ("B3", TraitDimension::Deference, true, "I challenge decisions made by senior leadership."),
    ("B4", TraitDimension::Deference, false, "I follow instructions from my manager without questioning them."),
    ("B5", TraitDimension::Diligence, false, "I double-check my work before I share it."),
    ("B6", TraitDimension::Diligence, true, "I ship work that is good enough rather than polishing it."),
    ("B7", TraitDimension::DataOrientation, false, "I want to see data before I accept a claim."),
    ("B8", TraitDimension::DataOrientation, true, "I trust my gut over the numbers."),
    ("C1", TraitDimension::Collaboration, false, "I prefer to solve problems together with colleagues."),
    ("C2", TraitDimension::Collaboration, true, "I would rather work alone than in a team."),
    ("C3", TraitDimension::Patience, false, "I stay calm when others take a long time to understand."),
    ("C4", TraitDimension::Patience, true, "I get frustrated when meetings move slowly."),
    ("C5", TraitDimension::EmotionalExpression, false, "I openly share how I feel about work situations."),
    ("C6", TraitDimension::EmotionalExpression, true, "I keep my emotions to myself at work."),
    ("D1", TraitDimension::RiskTolerance, false, "I am comfortable deciding with incomplete information."),
    ("D2", TraitDimension::RiskTolerance, true, "I avoid options whose outcome is uncertain."),
    ("D3", TraitDimension::Autonomy, false, "I prefer to decide for myself how to do my work."),
    ("D4", TraitDimension::Autonomy, true, "I like clear guidance on how tasks should be done."),
    ("D5", TraitDimension::Optimism, false, "I expect the projects I work on to succeed."),
    ("D6", TraitDimension::Optimism, true, "I assume something will go wrong."),
];

/// Immutable item table. Construct once and pass by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCatalog {
    items: Vec<ItemDefinition>,
}

impl ItemCatalog {
    /// The built-in 28-item questionnaire.
    pub fn standard() -> Self {
        let items = STANDARD_ITEMS
            .iter()
            .map(|(id, dimension, reversed, prompt)| ItemDefinition {
                id: (*id).to_string(),
                trait_name: dimension.as_str().to_string(),
                reversed: *reversed,
                prompt: (*prompt).to_string(),
            })
            .collect();
        Self { items }
    }

    /// Build a custom catalog.
    ///
    /// Rejects duplicate ids and any trait that does not have exactly one
    /// forward and one reversed item.
    pub fn new(items: Vec<ItemDefinition>) -> PersonaResult<Self> {
        let mut seen = BTreeSet::new();
        for item in &items {
            if !seen.insert(item.id.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "catalog.items".to_string(),
                    value: item.id.clone(),
                    reason: "duplicate item id".to_string(),
                }
                .into());
            }
        }

        let mut pairs: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for item in &items {
            let entry = pairs.entry(item.trait_name.as_str()).or_default();
            if item.reversed {
                entry.1 += 1;
            } else {
                entry.0 += 1;
            }
        }
        for (trait_name, (forward, reversed)) in pairs {
            if forward != 1 || reversed != 1 {
                return Err(ConfigError::InvalidValue {
                    field: "catalog.items".to_string(),
                    value: trait_name.to_string(),
                    reason: format!(
                        "trait needs one forward and one reversed item, found {} and {}",
                        forward, reversed
                    ),
                }
                .into());
            }
        }

        Ok(Self { items })
    }

    /// All items in questionnaire order.
    pub fn items(&self) -> &[ItemDefinition] {
        &self.items
    }

    /// Look up an item by id.
    pub fn get(&self, id: &str) -> Option<&ItemDefinition> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Check whether an id belongs to the catalog.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Distinct trait names, lexically sorted.
    pub fn trait_names(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|item| item.trait_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Items measuring one trait.
    pub fn items_for_trait<'a>(&'a self, trait_name: &'a str) -> impl Iterator<Item = &'a ItemDefinition> + 'a {
        self.items.iter().filter(move |item| item.trait_name == trait_name)
    }

    /// The fixed question set used for self-assessment.
    pub fn question_set(&self) -> Vec<Question> {
        self.items
            .iter()
            .map(|item| Question {
                id: item.id.clone(),
                prompt: item.prompt.clone(),
            })
            .collect()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for ItemCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PersonaError;

    #[test]
    fn test_standard_catalog_shape() {
        let catalog = ItemCatalog::standard();
        assert_eq!(catalog.len(), 28);
        assert_eq!(catalog.trait_names().len(), 14);

        let expected: Vec<String> = TraitDimension::ALL
            .iter()
            .map(|d| d.as_str().to_string())
            .collect();
        assert_eq!(catalog.trait_names(), expected);
    }

    #[test]
    fn test_standard_catalog_pairs_forward_and_reversed() {
        let catalog = ItemCatalog::standard();
        for trait_name in catalog.trait_names() {
            let items: Vec<_> = catalog.items_for_trait(&trait_name).collect();
            assert_eq!(items.len(), 2, "trait {}", trait_name);
            assert_eq!(items.iter().filter(|i| i.reversed).count(), 1, "trait {}", trait_name);
        }
    }

    #[test]
    fn test_standard_catalog_passes_own_validation() {
        let items = ItemCatalog::standard().items().to_vec();
        assert!(ItemCatalog::new(items).is_ok());
    }

    #[test]
    fn test_new_rejects_unpaired_trait() {
        let mut items = ItemCatalog::standard().items().to_vec();
        items[1].reversed = false;
        let err = ItemCatalog::new(items).unwrap_err();
        assert!(matches!(err, PersonaError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_new_rejects_duplicate_id() {
        let mut items = ItemCatalog::standard().items().to_vec();
        items[1].id = "A1".to_string();
        assert!(ItemCatalog::new(items).is_err());
    }

    #[test]
    fn test_question_set_matches_items() {
        let catalog = ItemCatalog::standard();
        let questions = catalog.question_set();
        assert_eq!(questions.len(), catalog.len());
        assert_eq!(questions[0].id, "A1");
        assert!(!questions[0].prompt.is_empty());
        assert!(catalog.contains("D6"));
        assert!(!catalog.contains("E1"));
    }
}
