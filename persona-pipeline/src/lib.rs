//! PERSONA Pipeline
//!
//! Ties the stages together: survey answers become a profile, profiles become
//! archetypes, profiles and archetypes become behavioral specifications, and a
//! specification can be interviewed to check it reproduces its profile.

pub mod pipeline;
pub mod self_validation;
pub mod session;

pub use pipeline::{Archetype, PersonaPipeline, SubjectSpecification};
pub use self_validation::{SelfValidation, ValidationOutcome};
pub use session::PersonaSession;
