//! Unified path management for co-pilot files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/integration-copilot/     # Config directory (platform dependent)
//! ├── config.toml                    # Application configuration
//! ├── secret.json                    # AI-service key
//! └── integration_config_v1.json     # Platform credentials
//! ```

use copilot_core::credentials::INTEGRATION_STORAGE_KEY;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "integration-copilot";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves the files the co-pilot reads and writes.
///
/// With a base path every file lives directly under it (used by tests and
/// by the `--config-dir` flag); otherwise the platform config directory is used.
#[derive(Debug, Clone, Default)]
pub struct CopilotPaths {
    base: Option<PathBuf>,
}

impl CopilotPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the co-pilot configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// The file should be readable by the owner only (600).
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    pub fn credentials_file(&self) -> Result<PathBuf, PathError> {
        Ok(self
            .config_dir()?
            .join(format!("{INTEGRATION_STORAGE_KEY}.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_path_layout() {
        let paths = CopilotPaths::new(Some(Path::new("/tmp/copilot")));
        assert_eq!(paths.config_file().unwrap(), PathBuf::from("/tmp/copilot/config.toml"));
        assert_eq!(paths.secret_file().unwrap(), PathBuf::from("/tmp/copilot/secret.json"));
        assert_eq!(
            paths.credentials_file().unwrap(),
            PathBuf::from("/tmp/copilot/integration_config_v1.json")
        );
    }
}
