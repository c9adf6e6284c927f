//! The inbound `submit` operation.
//!
//! Chains intent classification and prompt building, model resolution,
//! generation and (on the structured path) result extraction. Stateless apart
//! from the resolver's model cache; the conversation log is owned by the
//! caller and only read here.

use copilot_core::backend::ModelId;
use copilot_core::credentials::{PlatformCredentialSet, looks_malformed, mask_key, resolve_api_key};
use copilot_core::error::{PipelineError, Result};
use copilot_core::extract::ResultExtractor;
use copilot_core::platform::Platform;
use copilot_core::prompt::PromptBuilder;
use copilot_core::result::StructuredResult;
use copilot_core::secret::SecretService;
use copilot_core::session::ConversationTurn;
use copilot_interaction::ModelResolver;
use std::sync::Arc;

/// Everything one pipeline invocation needs.
#[derive(Debug, Clone, Default)]
pub struct SubmitRequest {
    pub prompt: String,
    /// Turns preceding `prompt`, oldest first.
    pub history: Vec<ConversationTurn>,
    /// Key typed by the user; wins over every other source.
    pub api_key: Option<String>,
    pub platform: Platform,
    pub preferred_model: Option<ModelId>,
    pub credentials: PlatformCredentialSet,
}

impl SubmitRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineReply {
    Plain(String),
    Structured(StructuredResult),
}

impl PipelineReply {
    pub fn into_turn(self) -> ConversationTurn {
        match self {
            Self::Plain(text) => ConversationTurn::assistant_text(text),
            Self::Structured(result) => ConversationTurn::assistant_structured(result),
        }
    }
}

pub struct IntegrationPipeline {
    resolver: Arc<ModelResolver>,
    prompt_builder: PromptBuilder,
    extractor: ResultExtractor,
    secret_service: Option<Arc<dyn SecretService>>,
}

impl IntegrationPipeline {
    pub fn new(resolver: Arc<ModelResolver>) -> Self {
        Self {
            resolver,
            prompt_builder: PromptBuilder::default(),
            extractor: ResultExtractor::default(),
            secret_service: None,
        }
    }

    pub fn with_prompt_builder(mut self, prompt_builder: PromptBuilder) -> Self {
        self.prompt_builder = prompt_builder;
        self
    }

    pub fn with_extractor(mut self, extractor: ResultExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Enables `secret.json` and environment keys as fallbacks.
    pub fn with_secret_service(mut self, secret_service: Arc<dyn SecretService>) -> Self {
        self.secret_service = Some(secret_service);
        self
    }

    pub fn resolver(&self) -> &Arc<ModelResolver> {
        &self.resolver
    }

    /// Runs one request to completion.
    ///
    /// # Errors
    ///
    /// - `NoCredential` when no key source yields a usable key, or the
    ///   service rejects the key
    /// - `NoReachableModel` when every candidate answers 404
    /// - `GenerationFailure` for non-success or transport failures
    /// - `MalformedStructuredResponse` when the structured reply cannot be
    ///   parsed or lacks code
    pub async fn submit(&self, request: SubmitRequest) -> Result<PipelineReply> {
        let SubmitRequest {
            prompt,
            history,
            api_key,
            platform,
            preferred_model,
            credentials,
        } = request;

        let (api_key, stored_model) = self.key_sources(api_key.as_deref()).await;
        let api_key = api_key.ok_or_else(|| {
            PipelineError::no_credential(
                "No API key detected. Pass --api-key, add it to secret.json, \
                 or set GEMINI_API_KEY.",
            )
        })?;
        if looks_malformed(&api_key) {
            tracing::warn!(
                length = api_key.chars().count(),
                "API key looks unusually short or malformed"
            );
        }
        let masked_key = mask_key(&api_key);
        tracing::info!(key = %masked_key, %platform, "Submitting request");

        let request = SubmitRequest {
            prompt,
            history,
            api_key: None,
            platform,
            preferred_model: match preferred_model {
                Some(model) => Some(model),
                // the stored model only seeds the first resolution for this key
                None if self.resolver.cached_for(&api_key).await.is_none() => stored_model,
                None => None,
            },
            credentials,
        };
        // diagnostics end up in the chat log and from there in later prompts
        self.run(&api_key, request)
            .await
            .map_err(|err| err.redact(&api_key, &masked_key))
    }

    async fn run(&self, api_key: &str, request: SubmitRequest) -> Result<PipelineReply> {
        let SubmitRequest {
            prompt,
            history,
            platform,
            preferred_model,
            credentials,
            ..
        } = request;

        let built = self
            .prompt_builder
            .build(&prompt, &history, platform, &credentials);
        tracing::debug!(
            mode = ?built.mode,
            prompt_chars = built.text.chars().count(),
            "Prompt built"
        );

        let model = self
            .resolver
            .resolve(api_key, preferred_model.as_ref())
            .await?;

        let raw = self
            .resolver
            .backend()
            .generate(&model, api_key, &built.text)
            .await?;
        tracing::debug!(%model, response_chars = raw.chars().count(), "Received response");

        if built.is_structured() {
            self.extractor.extract(&raw).map(PipelineReply::Structured)
        } else {
            Ok(PipelineReply::Plain(raw))
        }
    }

    /// The key a request would be sent with.
    pub async fn effective_api_key(&self, explicit: Option<&str>) -> Option<String> {
        self.key_sources(explicit).await.0
    }

    /// Picks the key by precedence: explicit > `secret.json` > environment.
    ///
    /// Also returns the model named in `secret.json`, used when the request
    /// has no preferred model of its own and nothing is cached for the key yet.
    async fn key_sources(&self, explicit: Option<&str>) -> (Option<String>, Option<ModelId>) {
        let Some(service) = &self.secret_service else {
            return (resolve_api_key([explicit]), None);
        };

        let secrets = service.load_secrets().await.unwrap_or_else(|e| {
            tracing::warn!("Ignoring secret file: {}", e);
            Default::default()
        });
        let (file_key, file_model) = secrets
            .gemini
            .map(|g| (Some(g.api_key), g.model_name))
            .unwrap_or_default();
        let env_key = service.environment_key();

        let key = resolve_api_key([explicit, file_key.as_deref(), env_key.as_deref()]);
        let model = file_model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(ModelId::from);
        (key, model)
    }
}
