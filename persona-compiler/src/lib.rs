//! PERSONA Compiler - Profile to behavioral specification
//!
//! Evaluates an ordered rule table against a (domain-adjusted) profile and
//! assembles the specification text handed to the text generator.

pub mod assembler;
pub mod rules;

pub use assembler::{SpecCompiler, NEUTRAL_DIRECTIVE};
pub use rules::{Condition, InjectionRule, RuleBook, RuleId};
