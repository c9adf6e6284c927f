//! File-backed platform credential store.
//!
//! Persists the `"<platform>:<fieldId>" -> value` map as a flat JSON object in
//! `integration_config_v1.json`. Only the CLI writes through this store; the
//! pipeline receives a loaded snapshot.

use crate::paths::CopilotPaths;
use crate::storage::{AtomicJsonError, AtomicJsonFile};
use anyhow::{Result, anyhow, bail};
use copilot_core::Platform;
use copilot_core::credentials::PlatformCredentialSet;
use std::path::PathBuf;

pub struct FileCredentialStore {
    file: AtomicJsonFile<PlatformCredentialSet>,
}

impl FileCredentialStore {
    /// Opens the store at the default location (or under `paths`' base).
    pub fn new(paths: &CopilotPaths) -> Result<Self> {
        let path = paths
            .credentials_file()
            .map_err(|e| anyhow!("Failed to get credentials path: {}", e))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicJsonFile::new(path),
        }
    }

    /// Loads the whole map; a missing file is an empty set.
    pub fn load(&self) -> Result<PlatformCredentialSet> {
        let loaded = self
            .file
            .load()
            .map_err(|e| anyhow!("Failed to load credentials: {}", e))?;
        Ok(loaded.unwrap_or_default())
    }

    /// Stores one field. The field id must exist in the platform's field table.
    pub fn set_field(&self, platform: Platform, field_id: &str, value: &str) -> Result<()> {
        if platform.field(field_id).is_none() {
            let known: Vec<&str> = platform.fields().iter().map(|f| f.id).collect();
            bail!(
                "Unknown field '{}' for {} (expected one of: {})",
                field_id,
                platform,
                known.join(", ")
            );
        }

        self.file
            .update(PlatformCredentialSet::new(), |creds| {
                creds.set(platform, field_id, value.trim());
                Ok::<(), AtomicJsonError>(())
            })
            .map_err(|e| anyhow!("Failed to save credentials: {}", e))?;

        tracing::info!(%platform, field_id, "Stored platform credential");
        Ok(())
    }

    /// Removes one field. Returns whether a value was present.
    pub fn clear_field(&self, platform: Platform, field_id: &str) -> Result<bool> {
        let mut removed = false;
        self.file
            .update(PlatformCredentialSet::new(), |creds| {
                removed = creds.remove(platform, field_id).is_some();
                Ok(())
            })
            .map_err(|e| anyhow!("Failed to save credentials: {}", e))?;
        Ok(removed)
    }

    pub fn path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }
}
