//! Secret service implementation.
//!
//! Loads `secret.json` once and caches it; also exposes the environment
//! fallback key.

use crate::paths::CopilotPaths;
use crate::storage::{SecretStorage, SecretStorageError};
use anyhow::{Result, anyhow};
use copilot_core::config::SecretConfig;
use copilot_core::secret::SecretService;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Environment variables consulted for a fallback key, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "VITE_GEMINI_API_KEY", "VITE_API_KEY"];

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

#[derive(Clone)]
pub struct SecretServiceImpl {
    storage: Arc<SecretStorage>,
    /// Cached secret config. Uses RwLock for thread-safe lazy loading.
    secrets: Arc<RwLock<Option<SecretConfig>>>,
    env_lookup: EnvLookup,
}

impl SecretServiceImpl {
    /// Creates a service reading `secret.json` from `paths` and keys from the process environment.
    pub fn new(paths: &CopilotPaths) -> Result<Self> {
        let path = paths
            .secret_file()
            .map_err(|e| anyhow!("Failed to get secret path: {}", e))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            storage: Arc::new(SecretStorage::with_path(path)),
            secrets: Arc::new(RwLock::new(None)),
            env_lookup: Arc::new(|name| std::env::var(name).ok()),
        }
    }

    /// Replaces the environment lookup (tests inject a fixed map).
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env_lookup = Arc::new(lookup);
        self
    }

    fn load_secrets_internal(&self) -> Result<SecretConfig, String> {
        {
            let read_lock = self.secrets.read().unwrap_or_else(|p| p.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = match self.storage.load() {
            Ok(config) => config,
            Err(SecretStorageError::NotFound(path)) => {
                tracing::debug!("No secret file at {}", path.display());
                SecretConfig::default()
            }
            Err(e) => return Err(format!("Failed to load secret file: {}", e)),
        };

        {
            let mut write_lock = self.secrets.write().unwrap_or_else(|p| p.into_inner());
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig, String> {
        self.load_secrets_internal()
    }

    fn environment_key(&self) -> Option<String> {
        API_KEY_ENV_VARS
            .iter()
            .copied()
            .find_map(|name| (self.env_lookup)(name).filter(|v| !v.trim().is_empty()))
    }
}
