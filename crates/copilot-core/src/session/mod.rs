//! Session-level domain types.

mod message;

pub use message::{ConversationTurn, MessageContent, MessageRole};
