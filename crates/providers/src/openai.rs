use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::agent_api::Turn;
use shared::settings::UpstreamSettings;
use std::sync::LazyLock;
use std::time::Duration;

use crate::error::{ProviderError, UpstreamError, GENERIC_FAILURE};
use crate::{CompletionProvider, GenerationResult, Usage, NO_RESPONSE_FALLBACK};

static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

/// Longest raw error body kept as diagnostic detail.
const MAX_DETAIL_CHARS: usize = 800;

// ── Request types ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    temperature: f32,
    max_tokens: u32,
}

// ── Response types ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    #[serde(default)]
    message: Option<OpenAIResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
    #[serde(default)]
    total_tokens: Option<u32>,
}

// ── Conversion ───────────────────────────────────────────────────────

/// Decode a 2xx body. Missing choices or content is not an error.
fn parse_success_body(body: &str) -> Result<GenerationResult, ProviderError> {
    let parsed: OpenAIResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Internal(e.to_string()))?;

    let text = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string());

    Ok(GenerationResult {
        text,
        usage: parsed.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
        model: parsed.model,
    })
}

/// Turn a non-2xx body into an [`UpstreamError`].
///
/// Prefers the provider's `{"error": {"message": ...}}` shape; otherwise the
/// generic message is used and a truncated copy of the body kept as detail.
fn parse_error_body(status: u16, body: &str) -> UpstreamError {
    let provider_error = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").cloned())
        .filter(|e| !e.is_null());

    match provider_error {
        Some(error) => UpstreamError {
            status: Some(status),
            message: error
                .get("message")
                .and_then(|m| m.as_str())
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(GENERIC_FAILURE)
                .to_string(),
            details: Some(error),
        },
        None => {
            let detail: String = body.chars().take(MAX_DETAIL_CHARS).collect();
            UpstreamError {
                status: Some(status),
                message: GENERIC_FAILURE.to_string(),
                details: if detail.trim().is_empty() {
                    None
                } else {
                    Some(Value::String(detail))
                },
            }
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

pub struct OpenAIClient {
    http: Client,
    auth_token: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIClient {
    /// Build a client from injected settings. The credential is not checked
    /// here; an empty key surfaces as the provider's authentication error.
    pub fn from_settings(settings: &UpstreamSettings) -> Self {
        Self {
            http: SHARED_HTTP.clone(),
            auth_token: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }

    pub async fn generate(&self, messages: &[Turn]) -> Result<GenerationResult, ProviderError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let req = OpenAIRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        tracing::debug!(model = %self.model, messages = messages.len(), "sending completion request");

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .header("Content-Type", "application/json")
            .json(&req)
            .send()
            .await
            .map_err(|e| UpstreamError::unreachable(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| UpstreamError {
            status: Some(status.as_u16()),
            ..UpstreamError::unreachable(e.to_string())
        })?;

        if !status.is_success() {
            return Err(parse_error_body(status.as_u16(), &body).into());
        }

        let result = parse_success_body(&body)?;
        tracing::debug!(
            model = result.model.as_deref().unwrap_or(&self.model),
            tokens = ?result.tokens_used(),
            "completion received"
        );
        Ok(result)
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenAIClient {
    async fn complete(&self, messages: &[Turn]) -> Result<GenerationResult, ProviderError> {
        self.generate(messages).await
    }
}
