//! Wiring of configuration, storage and the Gemini backend.

use crate::pipeline::IntegrationPipeline;
use crate::session::{ChatSession, SessionSettings};
use anyhow::{Context, Result};
use copilot_core::backend::{GenerativeBackend, ModelId};
use copilot_core::config::CopilotConfig;
use copilot_core::credentials::PlatformCredentialSet;
use copilot_core::extract::ResultExtractor;
use copilot_core::platform::Platform;
use copilot_core::prompt::PromptBuilder;
use copilot_core::secret::SecretService;
use copilot_infrastructure::{ConfigService, CopilotPaths, FileCredentialStore, SecretServiceImpl};
use copilot_interaction::{GeminiApiClient, KeyCheck, ModelResolver};
use std::path::Path;
use std::sync::Arc;

/// Per-run overrides, typically from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct SessionOverrides {
    pub platform: Option<Platform>,
    pub model: Option<String>,
    pub api_key: Option<String>,
}

/// Long-lived services shared by every session of one process.
pub struct CopilotApp {
    config: CopilotConfig,
    credential_store: FileCredentialStore,
    pipeline: Arc<IntegrationPipeline>,
}

impl CopilotApp {
    /// Loads configuration from `config_dir` (or the platform config dir) and
    /// builds the HTTP backend it names.
    pub fn bootstrap(config_dir: Option<&Path>) -> Result<Self> {
        let paths = CopilotPaths::new(config_dir);
        let config_service = ConfigService::new(&paths)?;
        let config = config_service
            .get_config()
            .with_context(|| format!("Failed to load {}", config_service.path().display()))?;

        let backend = GeminiApiClient::from_settings(&config.gemini)?;
        let secret_service: Arc<dyn SecretService> = Arc::new(SecretServiceImpl::new(&paths)?);
        let credential_store = FileCredentialStore::new(&paths)?;

        Ok(Self::with_backend(config, Arc::new(backend), secret_service, credential_store))
    }

    pub fn with_backend(
        config: CopilotConfig,
        backend: Arc<dyn GenerativeBackend>,
        secret_service: Arc<dyn SecretService>,
        credential_store: FileCredentialStore,
    ) -> Self {
        let resolver = Arc::new(ModelResolver::new(backend, config.gemini.model_candidates()));
        tracing::debug!(
            candidates = ?resolver.candidates(),
            base_url = %config.gemini.base_url,
            "Model resolver ready"
        );

        let pipeline = IntegrationPipeline::new(resolver)
            .with_prompt_builder(PromptBuilder::new(config.intent.classifier()))
            .with_extractor(ResultExtractor::new(config.extractor.excerpt_chars))
            .with_secret_service(secret_service);

        Self {
            config,
            credential_store,
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn resolver(&self) -> &Arc<ModelResolver> {
        self.pipeline.resolver()
    }

    /// Persisted platform credentials; an unreadable file counts as empty.
    pub fn load_credentials(&self) -> PlatformCredentialSet {
        self.credential_store.load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring stored credentials: {:#}", e);
            PlatformCredentialSet::default()
        })
    }

    /// Creates a session; overrides win over `config.toml`.
    pub fn new_session(&self, overrides: SessionOverrides) -> ChatSession {
        let preferred_model = overrides
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(ModelId::from)
            .or_else(|| self.config.gemini.preferred());

        ChatSession::new(
            self.pipeline.clone(),
            SessionSettings {
                platform: overrides.platform.unwrap_or(self.config.default_platform),
                preferred_model,
                api_key: overrides.api_key,
                credentials: self.load_credentials(),
            },
        )
    }

    /// The key `check-key` and `debug-key` operate on.
    pub async fn effective_api_key(&self, explicit: Option<&str>) -> Option<String> {
        self.pipeline.effective_api_key(explicit).await
    }

    pub async fn check_key(&self, explicit: Option<&str>) -> KeyCheck {
        let key = self.effective_api_key(explicit).await.unwrap_or_default();
        copilot_interaction::validate_api_key(self.resolver(), &key).await
    }
}
