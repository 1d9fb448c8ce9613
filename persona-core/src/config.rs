//! Configuration types

use crate::{ConfigError, PersonaResult};
use serde::{Deserialize, Serialize};

/// Cluster engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSettings {
    /// Upper bound on k. Must be at least 1.
    pub max_groups: usize,
    /// Lower bound on k; populations this size or smaller become singletons.
    pub min_groups: usize,
    pub max_iterations: usize,
    /// Convergence threshold on centroid movement.
    pub epsilon: f64,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            max_groups: 8,
            min_groups: 3,
            max_iterations: 50,
            epsilon: 0.001,
        }
    }
}

/// Validation analyzer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Minimum Pearson correlation for a pass.
    pub threshold: f64,
    /// Per-dimension difference below which a dimension counts as accurate.
    pub accuracy_tolerance: f64,
    /// Maximum number of remediation hints on failure.
    pub max_hints: usize,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            accuracy_tolerance: 0.5,
            max_hints: 3,
        }
    }
}

/// Rule compiler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Number of domain vocabulary terms included in a specification.
    pub vocabulary_sample: usize,
    /// Number of domain phrases included in a specification.
    pub phrase_sample: usize,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            vocabulary_sample: 6,
            phrase_sample: 2,
        }
    }
}

/// Master configuration struct.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub cluster: ClusterSettings,
    pub validation: ValidationSettings,
    pub compiler: CompilerSettings,
    /// Seed for k-means++ initialization. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_opt(key).unwrap_or(default)
}

/// Unset gives `None`; a malformed value is logged and also gives `None`.
fn env_opt<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    parse_env_value(key, &raw)
}

fn parse_env_value<T: std::str::FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = raw, "Malformed environment value, using default");
            None
        }
    }
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl PipelineConfig {
    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `PERSONA_CLUSTER_MAX_GROUPS` (default: 8)
    /// - `PERSONA_CLUSTER_MIN_GROUPS` (default: 3)
    /// - `PERSONA_CLUSTER_MAX_ITERATIONS` (default: 50)
    /// - `PERSONA_CLUSTER_EPSILON` (default: 0.001)
    /// - `PERSONA_VALIDATION_THRESHOLD` (default: 0.8)
    /// - `PERSONA_VALIDATION_ACCURACY_TOLERANCE` (default: 0.5)
    /// - `PERSONA_VALIDATION_MAX_HINTS` (default: 3)
    /// - `PERSONA_COMPILER_VOCABULARY_SAMPLE` (default: 6)
    /// - `PERSONA_COMPILER_PHRASE_SAMPLE` (default: 2)
    /// - `PERSONA_SEED` (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cluster: ClusterSettings {
                max_groups: env_or("PERSONA_CLUSTER_MAX_GROUPS", defaults.cluster.max_groups),
                min_groups: env_or("PERSONA_CLUSTER_MIN_GROUPS", defaults.cluster.min_groups),
                max_iterations: env_or(
                    "PERSONA_CLUSTER_MAX_ITERATIONS",
                    defaults.cluster.max_iterations,
                ),
                epsilon: env_or("PERSONA_CLUSTER_EPSILON", defaults.cluster.epsilon),
            },
            validation: ValidationSettings {
                threshold: env_or("PERSONA_VALIDATION_THRESHOLD", defaults.validation.threshold),
                accuracy_tolerance: env_or(
                    "PERSONA_VALIDATION_ACCURACY_TOLERANCE",
                    defaults.validation.accuracy_tolerance,
                ),
                max_hints: env_or("PERSONA_VALIDATION_MAX_HINTS", defaults.validation.max_hints),
            },
            compiler: CompilerSettings {
                vocabulary_sample: env_or(
                    "PERSONA_COMPILER_VOCABULARY_SAMPLE",
                    defaults.compiler.vocabulary_sample,
                ),
                phrase_sample: env_or(
                    "PERSONA_COMPILER_PHRASE_SAMPLE",
                    defaults.compiler.phrase_sample,
                ),
            },
            seed: env_opt("PERSONA_SEED"),
        }
    }

    /// Parse from TOML. Missing sections and fields take their defaults.
    pub fn from_toml_str(source: &str) -> PersonaResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - cluster.max_groups >= 1
    /// - cluster.max_iterations >= 1
    /// - cluster.epsilon > 0
    /// - validation.threshold in [-1.0, 1.0]
    /// - validation.accuracy_tolerance > 0
    pub fn validate(&self) -> PersonaResult<()> {
        self.cluster.validate()?;

        if !(-1.0..=1.0).contains(&self.validation.threshold) {
            return Err(invalid(
                "validation.threshold",
                self.validation.threshold,
                "threshold must be between -1.0 and 1.0",
            )
            .into());
        }

        if self.validation.accuracy_tolerance.is_nan() || self.validation.accuracy_tolerance <= 0.0 {
            return Err(invalid(
                "validation.accuracy_tolerance",
                self.validation.accuracy_tolerance,
                "accuracy_tolerance must be positive",
            )
            .into());
        }

        Ok(())
    }
}

impl ClusterSettings {
    /// Settings with the given group bounds and default iteration limits.
    pub fn with_bounds(max_groups: usize, min_groups: usize) -> Self {
        Self {
            max_groups,
            min_groups,
            ..Self::default()
        }
    }

    /// Effective lower bound on k. When `min_groups` exceeds `max_groups`
    /// the upper bound wins.
    pub fn floor_groups(&self) -> usize {
        self.min_groups.min(self.max_groups)
    }

    /// Validate cluster bounds. `max_groups < 1` is a contract violation;
    /// `min_groups` above `max_groups` is allowed.
    pub fn validate(&self) -> PersonaResult<()> {
        if self.max_groups < 1 {
            return Err(invalid(
                "cluster.max_groups",
                self.max_groups,
                "max_groups must be at least 1",
            )
            .into());
        }

        if self.max_iterations < 1 {
            return Err(invalid(
                "cluster.max_iterations",
                self.max_iterations,
                "max_iterations must be at least 1",
            )
            .into());
        }

        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(invalid(
                "cluster.epsilon",
                self.epsilon,
                "epsilon must be positive",
            )
            .into());
        }

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
