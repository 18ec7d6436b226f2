use serde_json::Value;

/// Fallback message when the provider gives no structured error.
pub const GENERIC_FAILURE: &str = "Failed to generate response";
/// Message used when the provider could not be reached at all.
pub const UNREACHABLE: &str = "Failed to reach upstream service";

/// The provider answered with a non-success status, or could not be reached.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct UpstreamError {
    /// HTTP status, absent for transport failures
    pub status: Option<u16>,
    pub message: String,
    /// Raw provider error payload for diagnostics
    pub details: Option<Value>,
}

impl UpstreamError {
    pub fn unreachable(detail: impl Into<String>) -> Self {
        Self {
            status: None,
            message: UNREACHABLE.to_string(),
            details: Some(Value::String(detail.into())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// The provider reported success but the payload could not be used.
    #[error("Unexpected provider response: {0}")]
    Internal(String),
}
