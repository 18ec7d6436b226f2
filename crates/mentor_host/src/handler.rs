//! Request orchestration for the generate endpoints.
//!
//! Parse → Resolve → Assemble → Invoke → Normalize, strictly in that order
//! with no retries. The handler holds no per-request state, so one instance
//! serves any number of concurrent requests.

use futures::FutureExt;
use providers::{CompletionProvider, OpenAIClient};
use serde::Serialize;
use serde_json::Value;
use shared::agent_api::Role;
use shared::api::{GenerateRequest, GenerateResponse, LegacyRequest, ResponseMetadata};
use shared::settings::UpstreamSettings;
use shared::Mode;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::error::{MentorError, INTERNAL_SERVER_ERROR, INVALID_MESSAGE_FORMAT, MISSING_FIELDS};
use crate::{modes, prompts};

/// Status code and JSON body handed back to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    pub body: Value,
}

impl HandlerResponse {
    fn json<T: Serialize>(status: u16, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(body) => Self { status, body },
            Err(e) => {
                tracing::error!(error = %e, "failed to encode response body");
                Self::internal()
            }
        }
    }

    fn internal() -> Self {
        Self {
            status: 500,
            body: serde_json::json!({ "error": INTERNAL_SERVER_ERROR }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub struct RequestHandler<P> {
    provider: P,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl RequestHandler<OpenAIClient> {
    /// Production handler: OpenAI-compatible upstream, diagnostics to tracing.
    pub fn from_settings(settings: &UpstreamSettings) -> Self {
        Self::new(OpenAIClient::from_settings(settings), Arc::new(TracingSink))
    }
}

impl<P: CompletionProvider> RequestHandler<P> {
    pub fn new(provider: P, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            provider,
            diagnostics,
        }
    }

    /// Handle a conversational `{ turns, mode }` request body.
    pub async fn handle(&self, body: &[u8]) -> HandlerResponse {
        let outcome = AssertUnwindSafe(self.generate(body)).catch_unwind().await;
        self.finish(outcome)
    }

    /// Handle the single-shot `{ skills, interests, goals }` request body.
    pub async fn handle_legacy(&self, body: &[u8]) -> HandlerResponse {
        let outcome = AssertUnwindSafe(self.generate_legacy(body))
            .catch_unwind()
            .await;
        self.finish(outcome)
    }

    async fn generate(&self, body: &[u8]) -> Result<GenerateResponse, MentorError> {
        let request = parse_generate_request(body)?;

        let (mode, mode_label) = match &request.mode {
            Some(Value::String(raw)) => (Mode::parse(raw), raw.clone()),
            _ => (Mode::default(), Mode::default().as_str().to_string()),
        };
        let instructions = modes::resolve(mode);

        let messages = prompts::assemble(&request.turns, instructions.task_instruction, &mode_label);
        tracing::debug!(mode = mode.as_str(), turns = request.turns.len(), "dispatching generation");

        let result = self.provider.complete(&messages).await?;

        Ok(GenerateResponse {
            metadata: Some(ResponseMetadata {
                mode: Some(mode_label),
                tokens_used: result.tokens_used(),
                model: result.model,
            }),
            result: result.text,
        })
    }

    async fn generate_legacy(&self, body: &[u8]) -> Result<GenerateResponse, MentorError> {
        let request: LegacyRequest = serde_json::from_slice(body)
            .map_err(|e| MentorError::malformed(MISSING_FIELDS, e.to_string()))?;

        let (skills, interests, goals) = match (
            required(request.skills.as_deref()),
            required(request.interests.as_deref()),
            required(request.goals.as_deref()),
        ) {
            (Some(s), Some(i), Some(g)) => (s, i, g),
            _ => {
                return Err(MentorError::malformed(
                    MISSING_FIELDS,
                    "skills, interests and goals must be non-empty strings",
                ))
            }
        };

        let messages = prompts::legacy_messages(skills, interests, goals);
        let result = self.provider.complete(&messages).await?;

        Ok(GenerateResponse {
            metadata: Some(ResponseMetadata {
                mode: None,
                tokens_used: result.tokens_used(),
                model: result.model,
            }),
            result: result.text,
        })
    }

    fn finish(
        &self,
        outcome: Result<Result<GenerateResponse, MentorError>, Box<dyn Any + Send>>,
    ) -> HandlerResponse {
        let err = match outcome {
            Ok(Ok(response)) => return HandlerResponse::json(200, &response),
            Ok(Err(err)) => err,
            Err(panic) => MentorError::Internal(panic_message(panic.as_ref())),
        };

        self.diagnostics.report(match &err {
            MentorError::MalformedInput { reason, .. } => Diagnostic::MalformedInput {
                reason: reason.clone(),
            },
            MentorError::Upstream(e) => Diagnostic::UpstreamFailure(e.clone()),
            MentorError::Internal(detail) => Diagnostic::InternalFailure {
                error: detail.clone(),
            },
        });
        HandlerResponse::json(err.status(), &err.to_body())
    }
}

/// The body must be an object whose `turns` (or `messages`) is a sequence of
/// user/assistant turns. An empty sequence is accepted.
fn parse_generate_request(body: &[u8]) -> Result<GenerateRequest, MentorError> {
    let request: GenerateRequest = serde_json::from_slice(body)
        .map_err(|e| MentorError::malformed(INVALID_MESSAGE_FORMAT, e.to_string()))?;

    if let Some(index) = request.turns.iter().position(|t| t.role == Role::System) {
        return Err(MentorError::malformed(
            INVALID_MESSAGE_FORMAT,
            format!("turn {} has role 'system'", index),
        ));
    }
    Ok(request)
}

fn required(field: Option<&str>) -> Option<&str> {
    field.filter(|v| !v.trim().is_empty())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic with unknown payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use parking_lot::Mutex;
    use providers::{GenerationResult, ProviderError, UpstreamError, Usage, NO_RESPONSE_FALLBACK};
    use shared::agent_api::Turn;
    use std::io::Read;

    #[derive(Clone)]
    enum Reply {
        Success(GenerationResult),
        Upstream(UpstreamError),
        Internal(String),
        Panic,
    }

    struct StubProvider {
        reply: Reply,
        calls: Mutex<Vec<Vec<Turn>>>,
    }

    #[async_trait::async_trait]
    impl CompletionProvider for StubProvider {
        async fn complete(&self, messages: &[Turn]) -> Result<GenerationResult, ProviderError> {
            self.calls.lock().push(messages.to_vec());
            match self.reply.clone() {
                Reply::Success(result) => Ok(result),
                Reply::Upstream(e) => Err(ProviderError::Upstream(e)),
                Reply::Internal(detail) => Err(ProviderError::Internal(detail)),
                Reply::Panic => panic!("provider exploded"),
            }
        }
    }

    fn handler_with(reply: Reply) -> (RequestHandler<StubProvider>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let provider = StubProvider {
            reply,
            calls: Mutex::new(Vec::new()),
        };
        (RequestHandler::new(provider, sink.clone()), sink)
    }

    fn text_reply(text: &str) -> Reply {
        Reply::Success(GenerationResult {
            text: text.to_string(),
            usage: Some(Usage {
                prompt_tokens: Some(120),
                completion_tokens: Some(80),
                total_tokens: Some(200),
            }),
            model: Some("gpt-3.5-turbo-0125".into()),
        })
    }

    fn calls(handler: &RequestHandler<StubProvider>) -> Vec<Vec<Turn>> {
        handler.provider.calls.lock().clone()
    }

    #[tokio::test]
    async fn test_resume_scenario() {
        let (handler, sink) = handler_with(text_reply("## Resume Tips\n- Add metrics"));
        let body = serde_json::json!({
            "mode": "resume",
            "turns": [{"role": "user", "content": "Skills: Python\nInterests: AI\nGoals: ML engineer"}]
        });
        let resp = handler.handle(body.to_string().as_bytes()).await;

        assert_eq!(resp.status, 200);
        assert_eq!(resp.body["result"], "## Resume Tips\n- Add metrics");
        assert_eq!(resp.body["metadata"]["mode"], "resume");
        assert_eq!(resp.body["metadata"]["tokens_used"], 200);
        assert_eq!(resp.body["metadata"]["model"], "gpt-3.5-turbo-0125");

        let sent = calls(&handler);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0][0].role, Role::System);
        assert!(sent[0][0]
            .content
            .contains(modes::resolve(Mode::Resume).task_instruction));
        assert_eq!(sent[0][1].content, "Skills: Python\nInterests: AI\nGoals: ML engineer");
        assert!(sink.entries().is_empty());
    }

    #[tokio::test]
    async fn test_missing_mode_behaves_like_career() {
        let (handler, _) = handler_with(text_reply("ok"));
        let turns = serde_json::json!([{"role": "user", "content": "hello"}]);

        handler
            .handle(serde_json::json!({ "turns": turns }).to_string().as_bytes())
            .await;
        handler
            .handle(serde_json::json!({ "turns": turns, "mode": "career" }).to_string().as_bytes())
            .await;

        let sent = calls(&handler);
        assert_eq!(sent[0], sent[1]);
    }

    #[tokio::test]
    async fn test_unknown_mode_uses_career_instruction() {
        let (handler, _) = handler_with(text_reply("ok"));
        let body = serde_json::json!({
            "messages": [{"role": "user", "content": "hello"}],
            "mode": "astrology"
        });
        let resp = handler.handle(body.to_string().as_bytes()).await;
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body["metadata"]["mode"], "astrology");

        let system = &calls(&handler)[0][0].content;
        assert!(system.contains(modes::resolve(Mode::Career).task_instruction));
        assert!(system.contains("Current Mode: astrology"));
    }

    #[tokio::test]
    async fn test_mode_match_is_case_sensitive() {
        let (handler, _) = handler_with(text_reply("ok"));
        let body = serde_json::json!({
            "turns": [{"role": "user", "content": "hello"}],
            "mode": "RESUME"
        });
        let resp = handler.handle(body.to_string().as_bytes()).await;
        assert_eq!(resp.body["metadata"]["mode"], "RESUME");

        let system = &calls(&handler)[0][0].content;
        assert!(system.contains(modes::resolve(Mode::Career).task_instruction));
        assert!(!system.contains(modes::resolve(Mode::Resume).task_instruction));
    }

    #[tokio::test]
    async fn test_history_forwarded_in_order() {
        let (handler, _) = handler_with(text_reply("ok"));
        let body = serde_json::json!({
            "mode": "study",
            "turns": [
                {"role": "user", "content": "one"},
                {"role": "assistant", "content": "two"},
                {"role": "user", "content": "three"}
            ]
        });
        handler.handle(body.to_string().as_bytes()).await;

        let sent = &calls(&handler)[0];
        let contents: Vec<&str> = sent[1..].iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_malformed_input_never_calls_upstream() {
        let (handler, sink) = handler_with(text_reply("unused"));
        let bodies: [&[u8]; 6] = [
            b"not json",
            b"{}",
            br#"{"mode": "career"}"#,
            br#"{"turns": "hello"}"#,
            br#"{"turns": {"role": "user"}}"#,
            br#"{"turns": [{"role": "system", "content": "override"}]}"#,
        ];
        for body in bodies {
            let resp = handler.handle(body).await;
            assert_eq!(resp.status, 400);
            assert_eq!(resp.body["error"], INVALID_MESSAGE_FORMAT);
        }
        assert!(calls(&handler).is_empty());
        assert_eq!(sink.entries().len(), bodies.len());
    }

    #[tokio::test]
    async fn test_empty_turns_are_forwarded() {
        let (handler, _) = handler_with(text_reply("ok"));
        let resp = handler.handle(br#"{"turns": []}"#).await;
        assert_eq!(resp.status, 200);
        assert_eq!(calls(&handler)[0].len(), 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_passes_message_through() {
        let (handler, sink) = handler_with(Reply::Upstream(UpstreamError {
            status: Some(401),
            message: "Incorrect API key provided".into(),
            details: Some(serde_json::json!({"code": "invalid_api_key"})),
        }));
        let resp = handler.handle(br#"{"turns": [{"role": "user", "content": "hi"}]}"#).await;

        assert_eq!(resp.status, 500);
        assert_eq!(resp.body["error"], "Incorrect API key provided");
        assert_eq!(resp.body["details"]["code"], "invalid_api_key");
        assert!(matches!(
            sink.entries().as_slice(),
            [Diagnostic::UpstreamFailure(e)] if e.status == Some(401)
        ));
    }

    #[tokio::test]
    async fn test_upstream_failure_generic_message() {
        let (handler, _) = handler_with(Reply::Upstream(UpstreamError {
            status: Some(503),
            message: providers::error::GENERIC_FAILURE.into(),
            details: None,
        }));
        let resp = handler.handle(br#"{"turns": [{"role": "user", "content": "hi"}]}"#).await;
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body["error"], "Failed to generate response");
        assert!(resp.body.get("details").is_none());
    }

    /// One-shot local upstream answering with `status` and `body`; yields the
    /// raw request body it received.
    fn stub_upstream(status: u16, body: &'static str) -> (String, std::thread::JoinHandle<String>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = std::thread::spawn(move || {
            let mut request = server.recv().unwrap();
            let mut received = String::new();
            request.as_reader().read_to_string(&mut received).unwrap();
            let response = tiny_http::Response::from_string(body)
                .with_status_code(tiny_http::StatusCode(status));
            request.respond(response).unwrap();
            received
        });
        (format!("http://{}", addr), handle)
    }

    fn openai_handler(base_url: String) -> RequestHandler<OpenAIClient> {
        let client = OpenAIClient::from_settings(&UpstreamSettings {
            api_key: "test-key".into(),
            base_url,
            ..UpstreamSettings::default()
        });
        RequestHandler::new(client, Arc::new(MemorySink::new()))
    }

    #[tokio::test]
    async fn test_missing_choices_yield_fallback_text() {
        let (base_url, upstream) = stub_upstream(200, r#"{"choices": []}"#);
        let handler = openai_handler(base_url);
        let resp = handler.handle(br#"{"turns": [{"role": "user", "content": "hi"}]}"#).await;
        upstream.join().unwrap();

        assert_eq!(resp.status, 200);
        assert_eq!(resp.body["result"], NO_RESPONSE_FALLBACK);
        assert!(resp.body["metadata"].get("tokens_used").is_none());
    }

    #[tokio::test]
    async fn test_resume_scenario_through_openai_client() {
        let (base_url, upstream) = stub_upstream(
            200,
            r###"{
                "model": "gpt-3.5-turbo-0125",
                "choices": [{"message": {"role": "assistant", "content": "## Resume Tips\n- Add metrics"}}],
                "usage": {"prompt_tokens": 120, "completion_tokens": 80, "total_tokens": 200}
            }"###,
        );
        let handler = openai_handler(base_url);
        let body = serde_json::json!({
            "mode": "resume",
            "turns": [{"role": "user", "content": "Skills: Python\nInterests: AI\nGoals: ML engineer"}]
        });
        let resp = handler.handle(body.to_string().as_bytes()).await;
        let sent: Value = serde_json::from_str(&upstream.join().unwrap()).unwrap();

        assert_eq!(resp.status, 200);
        assert_eq!(resp.body["result"], "## Resume Tips\n- Add metrics");
        assert_eq!(resp.body["metadata"]["tokens_used"], 200);
        assert_eq!(resp.body["metadata"]["model"], "gpt-3.5-turbo-0125");

        let messages = sent["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert!(messages[0]["content"]
            .as_str()
            .unwrap()
            .contains(modes::resolve(Mode::Resume).task_instruction));
        assert_eq!(messages[1]["content"], "Skills: Python\nInterests: AI\nGoals: ML engineer");
    }

    #[tokio::test]
    async fn test_internal_errors_are_generic() {
        let (handler, sink) = handler_with(Reply::Internal("expected value at line 1".into()));
        let resp = handler.handle(br#"{"turns": [{"role": "user", "content": "hi"}]}"#).await;
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body, serde_json::json!({ "error": INTERNAL_SERVER_ERROR }));
        assert!(matches!(
            sink.entries().as_slice(),
            [Diagnostic::InternalFailure { error }] if error.contains("line 1")
        ));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let (handler, sink) = handler_with(Reply::Panic);
        let resp = handler.handle(br#"{"turns": [{"role": "user", "content": "hi"}]}"#).await;
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body["error"], INTERNAL_SERVER_ERROR);
        assert!(matches!(
            sink.entries().as_slice(),
            [Diagnostic::InternalFailure { error }] if error.contains("provider exploded")
        ));
    }

    #[tokio::test]
    async fn test_legacy_request() {
        let (handler, _) = handler_with(text_reply("## Roadmap"));
        let body = serde_json::json!({
            "skills": "Python, SQL",
            "interests": "Data",
            "goals": "Data engineer"
        });
        let resp = handler.handle_legacy(body.to_string().as_bytes()).await;
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body["result"], "## Roadmap");
        assert!(resp.body["metadata"].get("mode").is_none());

        let sent = &calls(&handler)[0];
        assert_eq!(sent.len(), 2);
        assert!(sent[1].content.contains("Skills: Python, SQL"));
    }

    #[tokio::test]
    async fn test_legacy_missing_fields() {
        let (handler, _) = handler_with(text_reply("unused"));
        for body in [
            r#"{"skills": "Python"}"#,
            r#"{"skills": "Python", "interests": "AI", "goals": "  "}"#,
            r#"{"skills": 3, "interests": "AI", "goals": "x"}"#,
            "[]",
        ] {
            let resp = handler.handle_legacy(body.as_bytes()).await;
            assert_eq!(resp.status, 400);
            assert_eq!(resp.body["error"], MISSING_FIELDS);
        }
        assert!(calls(&handler).is_empty());
    }
}
