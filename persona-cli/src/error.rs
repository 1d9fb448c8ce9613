use persona_core::PersonaError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the `persona` binary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {reason}")]
    Json { path: PathBuf, reason: String },

    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Persona(#[from] PersonaError),
}

pub type CliResult<T> = Result<T, CliError>;
