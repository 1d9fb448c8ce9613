//! PERSONA Profile - Raw Answers to Profile Vectors
//!
//! The first half of the pipeline:
//!
//! ```text
//! RawResponseSet → normalize_all → aggregate → ProfileVector → apply_domain
//! ```
//!
//! `normalize_all` is the only gate for malformed survey data; everything after
//! it assumes a complete, in-range response set.

pub mod aggregator;
pub mod modifier;
pub mod normalizer;

pub use aggregator::aggregate;
pub use modifier::{apply_domain, DOMAIN_MODIFIER_WEIGHT};
pub use normalizer::{normalize, normalize_all, NormalizedScores};

use persona_core::{ItemCatalog, PersonaResult, ProfileVector, RawResponseSet};

/// Normalize and aggregate in one step.
pub fn build_profile(responses: &RawResponseSet, catalog: &ItemCatalog) -> PersonaResult<ProfileVector> {
    let normalized = normalize_all(responses, catalog)?;
    Ok(aggregate(&normalized, catalog))
}
