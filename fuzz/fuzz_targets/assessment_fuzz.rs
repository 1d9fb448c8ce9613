//! Fuzz target for the self-assessment parser
//!
//! Generator output is untrusted text. The parser must return Ok or Err for
//! any input and never yield ids outside the catalog.
//!
//! Run with: cargo +nightly fuzz run assessment_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use persona_core::ItemCatalog;
use persona_validation::parse_self_assessment;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let catalog = ItemCatalog::standard();
        if let Ok(answers) = parse_self_assessment(input, &catalog) {
            assert_eq!(answers.answers.len(), catalog.len());
            assert!(answers.answers.keys().all(|id| catalog.contains(id)));
        }
    }
});
