//! In-memory collaborators for pipeline and session tests.

use async_trait::async_trait;
use copilot_core::backend::{GenerativeBackend, ModelId, ProbeOutcome, RawProbeResponse};
use copilot_core::config::{GeminiSecret, SecretConfig};
use copilot_core::error::{PipelineError, Result};
use copilot_core::secret::SecretService;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Backend that knows a fixed set of models and returns one canned reply.
pub struct FakeBackend {
    available: HashSet<String>,
    reply: std::result::Result<String, PipelineError>,
    /// When set, each generation waits for a permit.
    gate: Option<Arc<Semaphore>>,
    /// Returned by the next probe only.
    probe_error: Mutex<Option<PipelineError>>,
    probes: Mutex<Vec<String>>,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl FakeBackend {
    pub fn available(models: &[&str]) -> Self {
        Self {
            available: models.iter().map(|m| m.to_string()).collect(),
            reply: Ok(String::new()),
            gate: None,
            probe_error: Mutex::new(None),
            probes: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_probe_error(self, error: PipelineError) -> Self {
        *self.probe_error.lock().unwrap() = Some(error);
        self
    }

    pub fn replying(mut self, text: &str) -> Arc<Self> {
        self.reply = Ok(text.to_string());
        Arc::new(self)
    }

    pub fn failing(mut self, error: PipelineError) -> Arc<Self> {
        self.reply = Err(error);
        Arc::new(self)
    }

    pub fn probes(&self) -> Vec<String> {
        self.probes.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.2.clone()).collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.1.clone()).collect()
    }

    pub fn generated_models(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.0.clone()).collect()
    }
}

#[async_trait]
impl GenerativeBackend for FakeBackend {
    async fn probe(&self, model: &ModelId, _api_key: &str) -> Result<ProbeOutcome> {
        self.probes.lock().unwrap().push(model.to_string());
        if let Some(error) = self.probe_error.lock().unwrap().take() {
            return Err(error);
        }
        if self.available.contains(model.as_str()) {
            Ok(ProbeOutcome::Available)
        } else {
            Ok(ProbeOutcome::NotFound)
        }
    }

    async fn generate(&self, model: &ModelId, api_key: &str, prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push((
            model.to_string(),
            api_key.to_string(),
            prompt.to_string(),
        ));
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.reply.clone()
    }

    async fn describe(&self, _model: &ModelId, _api_key: &str) -> RawProbeResponse {
        RawProbeResponse {
            ok: true,
            status: 200,
            body: serde_json::Value::Null,
        }
    }
}

pub struct FakeSecrets {
    file: SecretConfig,
    env: Option<String>,
}

impl FakeSecrets {
    pub fn with_stored_model(file_key: &str, model_name: &str) -> Arc<Self> {
        Arc::new(Self {
            file: SecretConfig {
                gemini: Some(GeminiSecret {
                    api_key: file_key.to_string(),
                    model_name: Some(model_name.to_string()),
                }),
            },
            env: None,
        })
    }

    pub fn new(file_key: Option<&str>, env_key: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            file: SecretConfig {
                gemini: file_key.map(|key| GeminiSecret {
                    api_key: key.to_string(),
                    model_name: None,
                }),
            },
            env: env_key.map(str::to_string),
        })
    }
}

#[async_trait]
impl SecretService for FakeSecrets {
    async fn load_secrets(&self) -> std::result::Result<SecretConfig, String> {
        Ok(self.file.clone())
    }

    fn environment_key(&self) -> Option<String> {
        self.env.clone()
    }
}
