//! State management for the Career Mentor app
//!
//! Holds the mentoring session, the form being edited, and the channel
//! of the request currently in flight.

use mentor_host::{ClientError, GenerateApi, HttpGenerateApi, MentorSession, ProfileForm};
use shared::api::{GenerateRequest, GenerateResponse};
use shared::settings::ClientSettings;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

pub type GenerationOutcome = Result<GenerateResponse, ClientError>;

/// Run one generation request in a background thread (non-blocking)
pub fn run_generation(api: Arc<dyn GenerateApi>, request: GenerateRequest, tx: Sender<GenerationOutcome>) {
    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            let _ = tx.send(Err(ClientError::Transport(format!(
                "Failed to start async runtime: {}",
                e
            ))));
            return;
        }
    };
    let outcome = rt.block_on(api.generate(&request));
    let _ = tx.send(outcome);
}

pub struct AppState {
    pub session: MentorSession,
    pub form: ProfileForm,
    api: Option<Arc<dyn GenerateApi>>,
    /// Set when the client could not be configured
    pub startup_error: Option<String>,
    result_rx: Option<Receiver<GenerationOutcome>>,
}

impl AppState {
    pub fn new(settings: &ClientSettings) -> Self {
        let (api, startup_error) = match HttpGenerateApi::new(settings) {
            Ok(api) => {
                tracing::info!(endpoint = %api.endpoint(), "using mentor server");
                (Some(Arc::new(api) as Arc<dyn GenerateApi>), None)
            }
            Err(e) => {
                tracing::error!(error = %e, "mentor client not configured");
                (None, Some(e.to_string()))
            }
        };
        Self::with_api(api, startup_error)
    }

    pub fn with_api(api: Option<Arc<dyn GenerateApi>>, startup_error: Option<String>) -> Self {
        Self {
            session: MentorSession::new(),
            form: ProfileForm::default(),
            api,
            startup_error,
            result_rx: None,
        }
    }

    pub fn can_submit(&self) -> bool {
        self.api.is_some() && !self.session.is_loading()
    }

    /// Append the user turn and start the request.
    pub fn submit(&mut self) {
        let Some(api) = self.api.clone() else {
            return;
        };
        let Some(request) = self.session.begin(&self.form) else {
            return;
        };

        let (tx, rx) = channel();
        self.result_rx = Some(rx);
        std::thread::spawn(move || run_generation(api, request, tx));
    }

    /// Check for a completed response (called each frame)
    pub fn poll_response(&mut self) {
        let Some(rx) = &self.result_rx else {
            return;
        };
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(std::sync::mpsc::TryRecvError::Empty) => return,
            Err(std::sync::mpsc::TryRecvError::Disconnected) => Err(ClientError::Transport(
                "request worker stopped unexpectedly".to_string(),
            )),
        };
        self.result_rx = None;

        if self.session.complete(outcome) {
            self.form.clear();
        }
    }
}
