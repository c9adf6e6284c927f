//! Interaction layer: talks to the Gemini API.
//!
//! Provides the HTTP backend, model resolution over a fallback list, and
//! API key checks built on top of both.

pub mod gemini_api_client;
pub mod key_check;
pub mod resolver;
pub mod supported_models;

pub use gemini_api_client::GeminiApiClient;
pub use key_check::{KeyCheck, debug_api_key, validate_api_key};
pub use resolver::ModelResolver;
