//! PERSONA Core - Data Model
//!
//! Pure data structures shared by every pipeline stage. All other crates depend on this.
//! Besides the value objects it holds the two pieces of static reference data the
//! pipeline reads: the survey item catalog and the domain lexicon.

pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod vector;

pub use catalog::{ItemCatalog, ItemDefinition, Question};
pub use config::{ClusterSettings, CompilerSettings, PipelineConfig, ValidationSettings};
pub use domain::{DomainConfig, DomainLexicon, GENERAL_DOMAIN};
pub use error::{ConfigError, LlmError, PersonaError, PersonaResult, ResponseError, VectorError};
pub use vector::{aligned_values, cosine_similarity, euclidean_distance, key_set_diff, squared_distance};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

// ============================================================================
// ROUNDING
// ============================================================================

/// Round to a fixed number of decimal places.
///
/// Uses `f64::round`, i.e. half away from zero (0.125 -> 0.13, -0.125 -> -0.13).
/// Every stored profile value goes through this so downstream tests can compare
/// exact values.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Round to two decimals, the precision of every profile coordinate.
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

// ============================================================================
// TRAIT DIMENSIONS
// ============================================================================

/// The fourteen personality dimensions measured by the survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitDimension {
    Agreeableness,
    Autonomy,
    Collaboration,
    DataOrientation,
    Deference,
    Diligence,
    Directness,
    EmotionalExpression,
    Formality,
    Humor,
    Optimism,
    Patience,
    RiskTolerance,
    Verbosity,
}

impl TraitDimension {
    /// All dimensions, in lexical order of their names.
    pub const ALL: [TraitDimension; 14] = [
        Self::Agreeableness,
        Self::Autonomy,
        Self::Collaboration,
        Self::DataOrientation,
        Self::Deference,
        Self::Diligence,
        Self::Directness,
        Self::EmotionalExpression,
        Self::Formality,
        Self::Humor,
        Self::Optimism,
        Self::Patience,
        Self::RiskTolerance,
        Self::Verbosity,
    ];

    /// Key used in profile vectors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agreeableness => "agreeableness",
            Self::Autonomy => "autonomy",
            Self::Collaboration => "collaboration",
            Self::DataOrientation => "data_orientation",
            Self::Deference => "deference",
            Self::Diligence => "diligence",
            Self::Directness => "directness",
            Self::EmotionalExpression => "emotional_expression",
            Self::Formality => "formality",
            Self::Humor => "humor",
            Self::Optimism => "optimism",
            Self::Patience => "patience",
            Self::RiskTolerance => "risk_tolerance",
            Self::Verbosity => "verbosity",
        }
    }

    /// Parse from a profile key.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// Human readable label for prompts and hints.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Agreeableness => "agreeableness",
            Self::Autonomy => "autonomy",
            Self::Collaboration => "collaboration",
            Self::DataOrientation => "data orientation",
            Self::Deference => "deference to authority",
            Self::Diligence => "diligence",
            Self::Directness => "directness",
            Self::EmotionalExpression => "emotional expression",
            Self::Formality => "formality",
            Self::Humor => "humor",
            Self::Optimism => "optimism",
            Self::Patience => "patience",
            Self::RiskTolerance => "risk tolerance",
            Self::Verbosity => "verbosity",
        }
    }
}

impl std::fmt::Display for TraitDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PROFILE VECTOR
// ============================================================================

/// Signal name for the domain skepticism scalar.
pub const DOMAIN_SKEPTICISM: &str = "domainSkepticism";
/// Signal name for the domain data-emphasis scalar.
pub const DOMAIN_DATA_EMPHASIS: &str = "domainDataEmphasis";

/// Trait name -> value in [-1, 1], plus the two domain-derived scalars.
///
/// Keys are held in a `BTreeMap` so iteration is always in lexical order, which
/// is the order used for flattening and distance computations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileVector {
    pub traits: BTreeMap<String, f64>,
    /// Attached by the domain modifier; 0.0 until then.
    #[serde(default)]
    pub domain_skepticism: f64,
    /// Attached by the domain modifier; 0.0 until then.
    #[serde(default)]
    pub domain_data_emphasis: f64,
}

impl ProfileVector {
    /// Create an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a profile from `(trait, value)` pairs.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        Self {
            traits: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..Self::default()
        }
    }

    /// Set a trait value.
    pub fn with_trait(mut self, name: impl Into<String>, value: f64) -> Self {
        self.traits.insert(name.into(), value);
        self
    }

    /// Value of a trait, if present.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.traits.get(name).copied()
    }

    /// Value of a known dimension, if present.
    pub fn dimension(&self, dimension: TraitDimension) -> Option<f64> {
        self.get(dimension.as_str())
    }

    /// Look up a trait or one of the two domain scalars by signal name.
    pub fn signal(&self, name: &str) -> Option<f64> {
        match name {
            DOMAIN_SKEPTICISM => Some(self.domain_skepticism),
            DOMAIN_DATA_EMPHASIS => Some(self.domain_data_emphasis),
            _ => self.get(name),
        }
    }

    /// Insert or replace a trait value.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.traits.insert(name.into(), value);
    }

    /// Trait names in lexical order.
    pub fn keys(&self) -> Vec<String> {
        self.traits.keys().cloned().collect()
    }

    /// Trait values in lexical key order.
    pub fn values(&self) -> Vec<f64> {
        self.traits.values().copied().collect()
    }

    /// Number of trait dimensions.
    pub fn len(&self) -> usize {
        self.traits.len()
    }

    /// Check if the profile has no trait dimensions.
    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    /// Stable SHA-256 digest of the profile contents (hex).
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (name, value) in &self.traits {
            hasher.update(format!("{}={:.6};", name, value).as_bytes());
        }
        hasher.update(
            format!(
                "{}={:.6};{}={:.6}",
                DOMAIN_SKEPTICISM, self.domain_skepticism, DOMAIN_DATA_EMPHASIS, self.domain_data_emphasis
            )
            .as_bytes(),
        );
        hex::encode(hasher.finalize())
    }
}

// ============================================================================
// RAW RESPONSES
// ============================================================================

/// Item id -> Likert score as submitted. Validated by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawResponseSet {
    pub answers: BTreeMap<String, i64>,
}

impl RawResponseSet {
    /// Build a response set from `(item, score)` pairs.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, i64)>,
    {
        Self {
            answers: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Decode a JSON object of item id -> integer.
    ///
    /// Integral floats (`4.0`) and numeric strings (`"4"`) are accepted; any
    /// other value is an `InvalidType` error. Range checking is left to the
    /// normalizer.
    pub fn from_json(value: &serde_json::Value) -> PersonaResult<Self> {
        let object = value.as_object().ok_or_else(|| ResponseError::InvalidType {
            item_id: "<root>".to_string(),
            reason: "expected a JSON object of item id to score".to_string(),
        })?;

        let mut answers = BTreeMap::new();
        for (item_id, raw) in object {
            answers.insert(item_id.clone(), json_score(item_id, raw)?);
        }
        Ok(Self { answers })
    }

    /// Score for an item, if present.
    pub fn get(&self, item_id: &str) -> Option<i64> {
        self.answers.get(item_id).copied()
    }

    /// Number of answers.
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// Check if there are no answers.
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

fn json_score(item_id: &str, raw: &serde_json::Value) -> PersonaResult<i64> {
    let invalid = |reason: String| {
        PersonaError::from(ResponseError::InvalidType {
            item_id: item_id.to_string(),
            reason,
        })
    };

    match raw {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                    _ => Err(invalid(format!("{} is not an integer", n))),
                }
            }
        }
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(format!("'{}' is not an integer", s))),
        other => Err(invalid(format!("unsupported JSON value {}", other))),
    }
}

// ============================================================================
// RESPONDENTS & CLUSTERS
// ============================================================================

/// Free-form demographic attributes (role, department, ...).
pub type Demographics = BTreeMap<String, String>;

/// One survey respondent as seen by the cluster engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespondentRecord {
    pub id: String,
    pub profile: ProfileVector,
    #[serde(default)]
    pub demographics: Demographics,
}

impl RespondentRecord {
    /// Create a respondent without demographics.
    pub fn new(id: impl Into<String>, profile: ProfileVector) -> Self {
        Self {
            id: id.into(),
            profile,
            demographics: Demographics::new(),
        }
    }

    /// Attach demographic attributes.
    pub fn with_demographics(mut self, demographics: Demographics) -> Self {
        self.demographics = demographics;
        self
    }
}

/// One group produced by a clustering run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Coordinate-wise mean of the members, rounded to 2 decimals.
    pub centroid: ProfileVector,
    pub members: Vec<RespondentRecord>,
    /// Always `members.len()`.
    pub size: usize,
    /// Mean distance from members to the centroid; lower is tighter.
    pub avg_distance: f64,
}

// ============================================================================
// COMPILED SPECIFICATION
// ============================================================================

/// Behavioral specification handed to the text generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledSpecification {
    pub text: String,
    /// Names of fired rules, in rule table order.
    pub applied_rules: Vec<String>,
    /// Canonical domain key the specification was compiled for.
    pub domain: String,
}

impl CompiledSpecification {
    /// Whether a given rule fired.
    pub fn applied(&self, rule_name: &str) -> bool {
        self.applied_rules.iter().any(|r| r == rule_name)
    }

    /// Stable SHA-256 digest of the specification text (hex).
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.text.as_bytes()))
    }
}

// ============================================================================
// VALIDATION RESULT
// ============================================================================

/// Per-dimension comparison between input and self-assessed profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionDiagnostic {
    pub trait_name: String,
    pub input_value: f64,
    pub assessed_value: f64,
    /// Absolute difference.
    pub difference: f64,
    /// `difference` below the accuracy tolerance.
    pub accurate: bool,
}

/// Direction in which instruction intensity should move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustDirection {
    Increase,
    Decrease,
}

impl AdjustDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
        }
    }
}

/// Suggested fix for a badly reproduced dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationHint {
    pub trait_name: String,
    pub direction: AdjustDirection,
    /// Signed gap, input minus assessed.
    pub gap: f64,
    pub message: String,
}

/// Outcome of comparing a profile with its self-assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub correlation: f64,
    pub cosine_similarity: f64,
    pub mean_absolute_error: f64,
    /// Sorted by difference, worst first.
    pub per_dimension: Vec<DimensionDiagnostic>,
    pub passed: bool,
    pub threshold: f64,
    /// Empty when the validation passed.
    pub hints: Vec<RemediationHint>,
}

// =============================================================================
// TESTS
// =============================================================================
