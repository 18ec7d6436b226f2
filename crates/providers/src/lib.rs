//! Completion provider access.
//!
//! A single upstream provider speaks the OpenAI chat-completions protocol;
//! callers depend on [`CompletionProvider`] so the orchestration can run
//! against a stub.

pub mod error;
pub mod openai;

pub use error::{ProviderError, UpstreamError};
pub use openai::OpenAIClient;

use serde::{Deserialize, Serialize};
use shared::agent_api::Turn;

/// Returned in place of the generated text when a successful response carries none.
pub const NO_RESPONSE_FALLBACK: &str = "No response generated";

/// Token accounting reported by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Outcome of one successful completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    /// Generated text; [`NO_RESPONSE_FALLBACK`] when the provider sent none.
    pub text: String,
    pub usage: Option<Usage>,
    /// Model identifier echoed by the provider
    pub model: Option<String>,
}

impl GenerationResult {
    pub fn tokens_used(&self) -> Option<u32> {
        self.usage.as_ref().and_then(|u| u.total_tokens)
    }
}

/// Anything that can turn a message sequence into generated text.
///
/// Note: Uses async_trait for object safety
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Issue exactly one completion call. Implementations must not retry.
    async fn complete(&self, messages: &[Turn]) -> Result<GenerationResult, ProviderError>;
}
