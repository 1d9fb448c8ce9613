//! PERSONA Validation - statistical self-consistency checks
//!
//! A compiled specification is "interviewed" with the same questionnaire the
//! subject answered. The answers are parsed, normalized and aggregated again,
//! then compared with the original profile.

pub mod analyzer;
pub mod parser;
pub mod stats;

pub use analyzer::{compare, validate};
pub use parser::parse_self_assessment;
pub use stats::{cosine, mean_absolute_error, pearson, pearson_raw};
