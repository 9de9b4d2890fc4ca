//! Generative-AI collaborator: the Gemini client and the caching assistant
//! built on top of it.
//!
//! The model is treated as an opaque text generator. Prompts go in, free
//! text comes out, and [`clean_output`] trims whatever junk the model wraps
//! around its answer. Nothing beyond the summary JSON shape is enforced.

mod clean;
mod client;
mod prompts;
mod service;

use thiserror::Error;

use crate::storage::StoreError;
use crate::util::UrlValidationError;

pub use clean::{clean_output, parse_summary, strip_code_fences};
pub use client::{GeminiClient, MAX_RESPONSE_SIZE};
pub use service::{
    Assistant, DAILY_CHALLENGE_FALLBACK, HEALTH_TIP_FAILED, NUTRITION_FALLBACK, REWRITE_FAILED,
    SUMMARY_FAILED,
};

#[derive(Debug, Error)]
pub enum AiError {
    #[error("No Gemini API key configured (set GEMINI_API_KEY or gemini_api_key in config.toml)")]
    MissingApiKey,
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid UTF-8 in response")]
    InvalidUtf8,
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(#[from] UrlValidationError),
    #[error("Model returned no text")]
    EmptyResponse,
    #[error("Malformed API response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
    /// User-facing failure of one generation task.
    #[error("{0}")]
    Generation(&'static str),
    #[error("Nothing to analyze: the food log is empty")]
    EmptyInput,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AiError {
    /// Returns true if this error is transient and the request should be retried.
    fn is_retryable(&self) -> bool {
        match self {
            AiError::Timeout(_) | AiError::Network(_) => true,
            AiError::HttpStatus(status) => *status == 429 || *status >= 500,
            AiError::MissingApiKey
            | AiError::ResponseTooLarge(_)
            | AiError::InvalidUtf8
            | AiError::InvalidBaseUrl(_)
            | AiError::EmptyResponse
            | AiError::MalformedResponse(_)
            | AiError::Generation(_)
            | AiError::EmptyInput
            | AiError::Store(_) => false,
        }
    }
}
