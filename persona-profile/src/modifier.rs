//! Domain modifier
//!
//! Shifts verbosity and formality toward the domain's style and stamps the
//! domain's skepticism and data-emphasis scalars onto the profile. Applying a
//! non-neutral domain twice compounds; applying `general` is a no-op.

use persona_core::{DomainConfig, ProfileVector, TraitDimension};

/// Fraction of a domain modifier added to the trait.
pub const DOMAIN_MODIFIER_WEIGHT: f64 = 0.5;

fn shift(profile: &mut ProfileVector, dimension: TraitDimension, modifier: f64) {
    // Absent dimensions stay absent; the key set must not change.
    if let Some(value) = profile.dimension(dimension) {
        let shifted = (value + modifier * DOMAIN_MODIFIER_WEIGHT).clamp(-1.0, 1.0);
        profile.insert(dimension.as_str(), shifted);
    }
}

/// Apply a domain's style to a profile, returning a new profile.
pub fn apply_domain(profile: &ProfileVector, domain: &DomainConfig) -> ProfileVector {
    let mut modified = profile.clone();

    shift(&mut modified, TraitDimension::Verbosity, domain.verbosity_modifier);
    shift(&mut modified, TraitDimension::Formality, domain.formality_modifier);

    modified.domain_skepticism = domain.skepticism;
    modified.domain_data_emphasis = domain.data_emphasis;

    tracing::debug!(
        domain = %domain.name,
        skepticism = domain.skepticism,
        data_emphasis = domain.data_emphasis,
        "Applied domain modifier"
    );
    modified
}

// =============================================================================
// TESTS
// =============================================================================
