//! API key validation and raw diagnostics.

use copilot_core::backend::RawProbeResponse;
use copilot_core::credentials::sanitize_key;
use copilot_core::error::{PipelineError, PipelineErrorKind};
use serde::Serialize;

use crate::resolver::ModelResolver;

const VALIDATION_PROMPT: &str = "Return ONLY the single word OK";

/// Outcome of [`validate_api_key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCheck {
    pub ok: bool,
    pub message: String,
}

impl KeyCheck {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Resolves a model for `api_key` and runs a one-word generation against it.
///
/// Any reply counts as a valid key; only the wording of the message differs.
pub async fn validate_api_key(resolver: &ModelResolver, api_key: &str) -> KeyCheck {
    let Some(key) = sanitize_key(api_key) else {
        return KeyCheck::failed("No key provided");
    };

    let outcome = async {
        let model = resolver.resolve(&key, None).await?;
        let reply = resolver
            .backend()
            .generate(&model, &key, VALIDATION_PROMPT)
            .await?;
        Ok::<_, PipelineError>((model, reply))
    }
    .await;

    match outcome {
        Ok((model, reply)) if reply.trim().to_uppercase().contains("OK") => {
            KeyCheck::ok(format!("Key is valid. Using model: {model}"))
        }
        Ok((model, _)) => KeyCheck::ok(format!(
            "Key responded (model: {model}) but unexpected content (still likely valid)."
        )),
        Err(err) if err.kind() == PipelineErrorKind::NoCredential || is_rejection(&err) => {
            KeyCheck::failed(
                "API key rejected by Gemini API (API_KEY_INVALID). Ensure you created a Gemini \
                 API key (not another Google API) and that it has no incompatible restrictions.",
            )
        }
        Err(err) => KeyCheck::failed(format!("Validation failed: {}", err.diagnostic())),
    }
}

fn is_rejection(err: &PipelineError) -> bool {
    matches!(err.status(), Some(401 | 403)) || {
        let text = err.diagnostic().to_ascii_lowercase();
        text.contains("api_key_invalid") || text.contains("api key not valid")
    }
}

/// Raw metadata fetch for the cached model, or the first fallback candidate.
///
/// Returns whatever the service answered so a user can see the exact error
/// JSON. Transport failures come back with `status == -1`.
pub async fn debug_api_key(resolver: &ModelResolver, api_key: &str) -> RawProbeResponse {
    let key = sanitize_key(api_key).unwrap_or_default();
    let model = match resolver.cached().await {
        Some(model) => model,
        None => match resolver.candidates().first() {
            Some(model) => model.clone(),
            None => {
                return RawProbeResponse {
                    ok: false,
                    status: -1,
                    body: serde_json::Value::String("No model candidates configured".into()),
                };
            }
        },
    };
    tracing::debug!(%model, "Fetching raw model metadata for key diagnostics");
    resolver.backend().describe(&model, &key).await
}
