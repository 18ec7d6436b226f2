//! Client side of a round trip: the session state the UI renders, and the
//! HTTP transport to the mentor server.

use reqwest::Client;
use shared::api::{ErrorBody, GenerateRequest, GenerateResponse, GENERATE_PATH};
use shared::settings::ClientSettings;
use shared::Mode;
use std::time::Duration;
use url::Url;

use crate::conversation::{compose_user_turn, ConversationStore, ProfileForm};

/// Matches the server's upstream timeout so a slow completion is not cut off
/// by the client first.
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(120);
/// Shown when the transport gives no usable message.
pub const GENERIC_CLIENT_ERROR: &str = "Failed to generate response";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{0}")]
    Server(String),

    #[error("Could not reach the mentor server: {0}")]
    Transport(String),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Unexpected server response: {0}")]
    Decode(String),
}

/// Sends one generation request to the mentor server.
///
/// Note: Uses async_trait for object safety
#[async_trait::async_trait]
pub trait GenerateApi: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ClientError>;
}

pub struct HttpGenerateApi {
    http: Client,
    endpoint: Url,
}

impl HttpGenerateApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        Self::with_timeout(settings, CLIENT_TIMEOUT)
    }

    pub fn with_timeout(settings: &ClientSettings, timeout: Duration) -> Result<Self, ClientError> {
        let endpoint = Url::parse(&settings.server_url)
            .and_then(|base| base.join(GENERATE_PATH))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", settings.server_url, e)))?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl GenerateApi for HttpGenerateApi {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, ClientError> {
        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Server(server_error_message(status.as_u16(), &body)));
        }

        resp.json::<GenerateResponse>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Prefer the server's `error` field, then the raw body, then a generic message.
fn server_error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("{} (HTTP {})", GENERIC_CLIENT_ERROR, status)
    } else {
        trimmed.to_string()
    }
}

/// Everything the UI needs to render a mentoring session.
///
/// At most one request is in flight; `begin` refuses while `is_loading`.
/// The user turn is appended before the call and kept even if the call
/// fails, so the next submission re-sends it as context.
#[derive(Debug, Clone, Default)]
pub struct MentorSession {
    conversation: ConversationStore,
    mode: Mode,
    loading: bool,
    result: Option<String>,
    error: Option<String>,
}

impl MentorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Latest generated guidance
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a submission. Returns the payload to send, or `None` when a
    /// request is already outstanding or the form is incomplete.
    pub fn begin(&mut self, form: &ProfileForm) -> Option<GenerateRequest> {
        if self.loading {
            return None;
        }
        if !form.is_complete() {
            self.error = Some("Please fill in your skills, interests, and goals.".to_string());
            return None;
        }

        self.error = None;
        self.conversation = self
            .conversation
            .append_user(compose_user_turn(self.mode, form));
        self.loading = true;

        Some(GenerateRequest {
            turns: self.conversation.turns().to_vec(),
            mode: Some(serde_json::Value::String(self.mode.as_str().to_string())),
        })
    }

    /// Finish the outstanding submission. Returns true when an assistant
    /// turn was appended.
    pub fn complete(&mut self, outcome: Result<GenerateResponse, ClientError>) -> bool {
        self.loading = false;
        match outcome {
            Ok(response) => {
                self.conversation = self.conversation.append_assistant(response.result.clone());
                self.result = Some(response.result);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "generation failed");
                let message = e.to_string();
                self.error = Some(if message.trim().is_empty() {
                    GENERIC_CLIENT_ERROR.to_string()
                } else {
                    message
                });
                false
            }
        }
    }

    /// `begin` + call + `complete` in one step.
    pub async fn submit<A: GenerateApi + ?Sized>(&mut self, api: &A, form: &ProfileForm) -> bool {
        let Some(request) = self.begin(form) else {
            return false;
        };
        let outcome = api.generate(&request).await;
        self.complete(outcome)
    }
}
