//! GeminiApiClient - Direct REST API implementation for Gemini.
//!
//! Implements [`GenerativeBackend`] with two calls: a metadata GET used as the
//! model probe and `:generateContent` for generation. The API key travels as
//! the `key` query parameter and is never logged.

use async_trait::async_trait;
use copilot_core::backend::{GenerativeBackend, ModelId, ProbeOutcome, RawProbeResponse};
use copilot_core::config::{DEFAULT_GEMINI_BASE_URL, GeminiSettings};
use copilot_core::error::{PipelineError, Result};
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP client for the Gemini generative-language API.
#[derive(Clone)]
pub struct GeminiApiClient {
    client: Client,
    base_url: String,
}

impl GeminiApiClient {
    /// Creates a client against `base_url` (no trailing `/models/<id>`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| PipelineError::unknown(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn from_settings(settings: &GeminiSettings) -> Result<Self> {
        Self::new(
            settings.base_url.clone(),
            Duration::from_secs(settings.request_timeout_secs.max(1)),
        )
    }

    fn model_url(&self, model: &ModelId) -> String {
        format!("{}/{}", self.base_url, model)
    }

    fn generate_url(&self, model: &ModelId) -> String {
        format!("{}/{}:generateContent", self.base_url, model)
    }
}

impl Default for GeminiApiClient {
    fn default() -> Self {
        Self::with_client(Client::new(), DEFAULT_GEMINI_BASE_URL)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiApiClient {
    async fn probe(&self, model: &ModelId, api_key: &str) -> Result<ProbeOutcome> {
        let response = self
            .client
            .get(self.model_url(model))
            .query(&[("key", api_key)])
            .send()
            .await
            .map_err(|err| {
                PipelineError::generation(
                    None,
                    format!("Model probe error ({model}): {}", transport_error(err)),
                )
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%model, "Model probe succeeded");
            return Ok(ProbeOutcome::Available);
        }
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(%model, "Model probe returned 404, trying next candidate");
            return Ok(ProbeOutcome::NotFound);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
        let message = format!("Model probe error ({model}): {}", describe_error_body(&body));

        if is_credential_rejection(status, &body) {
            return Err(PipelineError::no_credential(format!(
                "API key rejected by Gemini API ({}). {message}",
                status.as_u16()
            )));
        }
        Err(PipelineError::generation(Some(status.as_u16()), message))
    }

    async fn generate(&self, model: &ModelId, api_key: &str, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(self.generate_url(model))
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                PipelineError::generation(
                    None,
                    format!("Gemini API request failed: {}", transport_error(err)),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, &body_text, retry_after));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            PipelineError::generation(
                None,
                format!("Failed to parse Gemini response: {}", transport_error(err)),
            )
        })?;

        extract_text_response(parsed)
    }

    async fn describe(&self, model: &ModelId, api_key: &str) -> RawProbeResponse {
        let response = match self
            .client
            .get(self.model_url(model))
            .query(&[("key", api_key)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                return RawProbeResponse {
                    ok: false,
                    status: -1,
                    body: serde_json::Value::String(transport_error(err)),
                };
            }
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text));
        RawProbeResponse {
            ok: status.is_success(),
            status: i32::from(status.as_u16()),
            body,
        }
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Concatenated text parts of the first candidate.
fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    let text = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .filter(|text| !text.is_empty());

    match text {
        Some(text) => Ok(text),
        None => {
            let reason = response
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
                .map(|reason| format!(" (prompt blocked: {reason})"))
                .unwrap_or_default();
            Err(PipelineError::generation(
                None,
                format!("Gemini API returned no text in the response candidates{reason}"),
            ))
        }
    }
}

/// reqwest error text without the request URL, which carries the key.
fn transport_error(err: reqwest::Error) -> String {
    let err = err.without_url();
    match std::error::Error::source(&err) {
        Some(source) => format!("{err} ({source})"),
        None => err.to_string(),
    }
}

/// `STATUS: message` from a Gemini error envelope, or the raw body.
fn describe_error_body(body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string())
}

/// Gemini reports a bad key as 400 `API_KEY_INVALID`, or as 401/403.
fn is_credential_rejection(status: StatusCode, body: &str) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || body.contains("API_KEY_INVALID")
        || body.to_ascii_lowercase().contains("api key not valid")
}

fn map_http_error(status: StatusCode, body: &str, retry_after: Option<Duration>) -> PipelineError {
    let mut message = describe_error_body(body);
    if let Some(delay) = retry_after {
        message = format!("{message} (retry after {}s)", delay.as_secs());
    }
    PipelineError::generation(
        Some(status.as_u16()),
        format!("Chat request failed: {} {message}", status.as_u16()),
    )
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    // HTTP-date values are ignored
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_error_body_uses_envelope() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(describe_error_body(body), "INVALID_ARGUMENT: API key not valid.");
        assert_eq!(describe_error_body("plain failure"), "plain failure");
    }

    #[test]
    fn test_credential_rejection_detection() {
        assert!(is_credential_rejection(StatusCode::UNAUTHORIZED, ""));
        assert!(is_credential_rejection(StatusCode::FORBIDDEN, ""));
        assert!(is_credential_rejection(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"details":[{"reason":"API_KEY_INVALID"}]}}"#
        ));
        assert!(!is_credential_rejection(StatusCode::INTERNAL_SERVER_ERROR, "oops"));
    }

    #[test]
    fn test_parse_retry_after_seconds_only() {
        let header = HeaderValue::from_static("12");
        assert_eq!(parse_retry_after(Some(&header)), Some(Duration::from_secs(12)));
        let date = HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(parse_retry_after(Some(&date)), None);
        assert_eq!(parse_retry_after(None), None);
    }

    #[test]
    fn test_extract_text_joins_parts_of_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[
                {"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}},
                {"content":{"parts":[{"text":"second"}]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(extract_text_response(response).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_extract_text_reports_block_reason() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        let err = extract_text_response(response).unwrap_err();
        assert!(err.diagnostic().contains("prompt blocked: SAFETY"));
    }

    #[test]
    fn test_map_http_error_keeps_status() {
        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#,
            Some(Duration::from_secs(30)),
        );
        assert_eq!(err.status(), Some(429));
        assert!(err.diagnostic().contains("RESOURCE_EXHAUSTED: quota"));
        assert!(err.diagnostic().contains("retry after 30s"));
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = GeminiApiClient::with_client(Client::new(), "http://localhost:1/models/");
        assert_eq!(
            client.generate_url(&ModelId::from("gemini-2.5-flash")),
            "http://localhost:1/models/gemini-2.5-flash:generateContent"
        );
    }
}
