//! Completion provider seam and the retrying client built on it.
//!
//! Provides an abstraction layer over rig-core so the pipeline and tests
//! never depend on the HTTP client directly.

pub mod client;
pub mod offline;
pub mod retry;
pub mod rig;

use async_trait::async_trait;
use thiserror::Error;

pub use client::CompletionClient;
pub use retry::RetryPolicy;

/// Errors from a completion provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("LLM API error: {0}")]
    ApiError(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// Model and sampling temperature for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f64,
}

impl ModelSettings {
    pub fn new(model: impl Into<String>, temperature: f64) -> Self {
        Self {
            model: model.into(),
            temperature,
        }
    }
}

/// A single chat completion request.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub model: &'a str,
    pub temperature: f64,
    pub seed: u64,
}

/// Something that turns a system and user message into completion text.
///
/// Implementations issue exactly one request per call; retrying is the
/// caller's job.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, ProviderError>;

    /// `true` when responses are placeholders rather than model output.
    fn is_offline(&self) -> bool {
        false
    }
}
