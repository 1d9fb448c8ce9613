//! Fuzz target for raw response ingestion and profile aggregation
//!
//! Run with: cargo +nightly fuzz run responses_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use persona_core::{ItemCatalog, RawResponseSet};
use persona_profile::build_profile;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Ok(responses) = RawResponseSet::from_json(&value) else {
        return;
    };
    if let Ok(profile) = build_profile(&responses, &ItemCatalog::standard()) {
        assert!(profile.values().iter().all(|v| (-1.0..=1.0).contains(v)));
    }
});
