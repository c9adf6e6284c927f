//! Application layer for the integration co-pilot.
//!
//! This crate provides the `submit` pipeline and the chat session that
//! coordinate the domain (core) and the Gemini backend (interaction).

pub mod app;
pub mod pipeline;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{CopilotApp, SessionOverrides};
pub use pipeline::{IntegrationPipeline, PipelineReply, SubmitRequest};
pub use session::{ChatSession, SessionError, SubmitOutcome};
