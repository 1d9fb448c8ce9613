//! Trait aggregator

use crate::NormalizedScores;
use persona_core::{round2, ItemCatalog, ProfileVector};
use std::collections::BTreeMap;

/// Average each trait's normalized items into a profile vector.
///
/// Output has exactly one entry per trait in the catalog, rounded to 2
/// decimals. Input is assumed to have passed `normalize_all`; an item missing
/// from `normalized` simply does not contribute.
pub fn aggregate(normalized: &NormalizedScores, catalog: &ItemCatalog) -> ProfileVector {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();

    for item in catalog.items() {
        let entry = sums.entry(item.trait_name.as_str()).or_insert((0.0, 0));
        if let Some(value) = normalized.get(&item.id) {
            entry.0 += value;
            entry.1 += 1;
        }
    }

    let mut profile = ProfileVector::new();
    for (trait_name, (sum, count)) in sums {
        let mean = if count == 0 { 0.0 } else { sum / count as f64 };
        profile.insert(trait_name, round2(mean));
    }
    profile
}

// =============================================================================
// TESTS
// =============================================================================
