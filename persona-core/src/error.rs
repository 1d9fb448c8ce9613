//! Error types for PERSONA operations

use thiserror::Error;

/// Survey response errors. Raised only at the normalizer boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResponseError {
    #[error("Likert score {value} out of range 1-5 for item {}", .item_id.as_deref().unwrap_or("<unscoped>"))]
    OutOfRange { item_id: Option<String>, value: i64 },

    #[error("Response set is missing catalog item {item_id}")]
    MissingItem { item_id: String },

    #[error("Response set contains unknown item {item_id}")]
    UnknownItem { item_id: String },

    #[error("Invalid value for item {item_id}: {reason}")]
    InvalidType { item_id: String, reason: String },
}

/// Vector comparison errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VectorError {
    #[error("Dimension mismatch: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },

    #[error("Key set mismatch: missing {missing:?}, unexpected {unexpected:?}")]
    KeySetMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to parse configuration: {reason}")]
    Parse { reason: String },
}

/// Text generator errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("No text generator configured")]
    ProviderNotConfigured,

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: i32,
        message: String,
    },

    #[error("Rate limited by {provider}, retry after {retry_after_ms}ms")]
    RateLimited {
        provider: String,
        retry_after_ms: i64,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Self-assessment could not be parsed: {reason}")]
    ParseFailure { reason: String },
}

/// Master error type for all PERSONA errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersonaError {
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    #[error("Vector error: {0}")]
    Vector(#[from] VectorError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Result type alias for PERSONA operations.
pub type PersonaResult<T> = Result<T, PersonaError>;

// =============================================================================
// TESTS
// =============================================================================
