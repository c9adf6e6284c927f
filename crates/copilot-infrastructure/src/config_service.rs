//! Configuration service implementation.
//!
//! Loads `config.toml` and caches it. A missing file means defaults; a
//! malformed file is reported rather than silently replaced.

use crate::paths::CopilotPaths;
use anyhow::{Context, Result, anyhow};
use copilot_core::config::CopilotConfig;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<CopilotConfig>>>,
}

impl ConfigService {
    pub fn new(paths: &CopilotPaths) -> Result<Self> {
        let path = paths
            .config_file()
            .map_err(|e| anyhow!("Failed to get config path: {}", e))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<CopilotConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|p| p.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        {
            let mut write_lock = self.config.write().unwrap_or_else(|p| p.into_inner());
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Writes a commented default `config.toml` if none exists yet.
    pub fn ensure_default_file(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let body = CopilotConfig::default()
            .to_toml_string()
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;
        fs::write(&self.path, format!("# Integration Co-pilot configuration\n\n{body}"))
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(true)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn load_config(&self) -> Result<CopilotConfig> {
        if !self.path.exists() {
            tracing::debug!("No config file at {}, using defaults", self.path.display());
            return Ok(CopilotConfig::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        CopilotConfig::from_toml_str(&content)
            .map_err(|e| anyhow!("Failed to parse {}: {}", self.path.display(), e))
    }
}
