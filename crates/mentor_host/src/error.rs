use providers::{ProviderError, UpstreamError};
use shared::api::ErrorBody;

pub const INVALID_MESSAGE_FORMAT: &str = "Invalid message format";
pub const MISSING_FIELDS: &str = "Missing required fields";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Failure of one request. Every variant is terminal for that request.
#[derive(Debug, thiserror::Error)]
pub enum MentorError {
    /// The inbound payload was rejected before any upstream call.
    #[error("{message}: {reason}")]
    MalformedInput {
        message: &'static str,
        reason: String,
    },

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Anything else; the detail is logged, never returned to the caller.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MentorError {
    pub fn malformed(message: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            message,
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            MentorError::MalformedInput { .. } => 400,
            MentorError::Upstream(_) | MentorError::Internal(_) => 500,
        }
    }

    /// Response body for the caller
    pub fn to_body(&self) -> ErrorBody {
        match self {
            MentorError::MalformedInput { message, .. } => ErrorBody::new(*message),
            MentorError::Upstream(e) => ErrorBody {
                error: e.message.clone(),
                details: e.details.clone(),
            },
            MentorError::Internal(_) => ErrorBody::new(INTERNAL_SERVER_ERROR),
        }
    }
}

impl From<ProviderError> for MentorError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Upstream(e) => MentorError::Upstream(e),
            ProviderError::Internal(detail) => MentorError::Internal(detail),
        }
    }
}
