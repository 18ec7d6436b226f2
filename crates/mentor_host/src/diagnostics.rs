//! Failure reporting for the request handler.
//!
//! The handler never logs directly; it hands each failure to a
//! [`DiagnosticSink`]. Production uses [`TracingSink`], tests can inspect a
//! [`MemorySink`].

use parking_lot::Mutex;
use providers::UpstreamError;

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    MalformedInput { reason: String },
    UpstreamFailure(UpstreamError),
    InternalFailure { error: String },
}

pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Emits diagnostics as tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::MalformedInput { reason } => {
                tracing::warn!(%reason, "rejected malformed request");
            }
            Diagnostic::UpstreamFailure(e) => {
                tracing::error!(
                    status = ?e.status,
                    message = %e.message,
                    details = ?e.details,
                    "completion provider error"
                );
            }
            Diagnostic::InternalFailure { error } => {
                tracing::error!(%error, "server error");
            }
        }
    }
}

/// Keeps every diagnostic in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, diagnostic: Diagnostic) {
        self.entries.lock().push(diagnostic);
    }
}
