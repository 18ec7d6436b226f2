//! Mentor Host - career guidance orchestration
//!
//! This crate provides:
//! - Mode resolution into task instructions and framing sentences
//! - System prompt assembly around the user's conversation
//! - The request handler behind the generate endpoints
//! - The client-side conversation store and session state

pub mod client;
pub mod conversation;
pub mod diagnostics;
pub mod error;
pub mod handler;
pub mod modes;
pub mod prompts;

pub use client::{ClientError, GenerateApi, HttpGenerateApi, MentorSession};
pub use conversation::{compose_user_turn, ConversationStore, ProfileForm};
pub use diagnostics::{Diagnostic, DiagnosticSink, MemorySink, TracingSink};
pub use error::MentorError;
pub use handler::{HandlerResponse, RequestHandler};
pub use modes::{resolve, resolve_str, ModeInstructions};
