//! Text generator provider implementations

pub mod openai;

pub use openai::{OpenAiClient, OpenAiCompatibleGenerator};

use persona_core::{LlmError, PersonaError};

pub(crate) fn request_failed(provider: &str, status: i32, message: impl Into<String>) -> PersonaError {
    LlmError::RequestFailed {
        provider: provider.to_string(),
        status,
        message: message.into(),
    }
    .into()
}

pub(crate) fn rate_limited(provider: &str, retry_after_ms: i64) -> PersonaError {
    LlmError::RateLimited {
        provider: provider.to_string(),
        retry_after_ms,
    }
    .into()
}

pub(crate) fn invalid_response(provider: &str, reason: impl Into<String>) -> PersonaError {
    LlmError::InvalidResponse {
        provider: provider.to_string(),
        reason: reason.into(),
    }
    .into()
}
