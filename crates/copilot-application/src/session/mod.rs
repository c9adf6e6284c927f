//! Chat session orchestration.
//!
//! Owns the message log of one conversation and serializes requests to the
//! pipeline.

mod chat;

pub use chat::{ChatSession, GREETING, SessionError, SessionSettings, SubmitOutcome};
