//! Supported Gemini model versions.
//!
//! # Default fallback list (as of 2026-10)
//!
//! | Model ID | Tier | Notes |
//! |----------|------|-------|
//! | `gemini-2.5-flash` | Stable default | Fast, budget-friendly; tried first |
//! | `gemini-2.5-pro` | Stable | Tried when Flash is not available to the key |
//!
//! Reference: <https://ai.google.dev/gemini-api/docs/models>
//!
//! # Updating
//!
//! 1. Edit `DEFAULT_MODEL_FALLBACKS` in `copilot-core/src/config.rs`.
//! 2. Update the table above.
//! 3. Users can override the list per machine with `[gemini] models = [...]`
//!    in `config.toml`, or pick a model per run with `--model`.
//!
//! A `model_name` in `secret.json` is probed only while nothing is cached for
//! the key; `--model` and `[gemini] preferred_model` are probed on every turn.
//!
//! Keep stable versions ahead of previews: the resolver adopts the first
//! candidate the key can see and keeps it for the rest of the session.

use copilot_core::backend::ModelId;
use copilot_core::config::DEFAULT_MODEL_FALLBACKS;

/// The built-in fallback list as model identifiers.
pub fn default_fallbacks() -> Vec<ModelId> {
    DEFAULT_MODEL_FALLBACKS.iter().copied().map(ModelId::from).collect()
}
