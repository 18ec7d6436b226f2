//! Request and response bodies of the `/api/generate` and `/api/roadmap` endpoints.

use serde::{Deserialize, Serialize};

use crate::agent_api::Turn;

/// Conversational endpoint, served by the mentor server and called by the client.
pub const GENERATE_PATH: &str = "/api/generate";
/// Single-shot endpoint taking the three form fields.
pub const LEGACY_PATH: &str = "/api/roadmap";

/// Conversational request: the full turn history plus the selected mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Older clients send this field as `messages`.
    #[serde(alias = "messages")]
    pub turns: Vec<Turn>,
    /// Kept as raw JSON so an unexpected type falls back to the default mode
    /// instead of rejecting the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<serde_json::Value>,
}

/// Single-shot request: the three form fields, no history and no mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyRequest {
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub interests: Option<String>,
    #[serde(default)]
    pub goals: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Body of every 4xx/5xx response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}
