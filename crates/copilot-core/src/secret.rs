//! Secret management service trait.
//!
//! Defines the interface for loading the AI-service key.

use crate::config::SecretConfig;

/// Service for loading secret configuration.
///
/// # Security Note
///
/// Implementations must never log or embed secret values in error messages.
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration.
    ///
    /// # Returns
    ///
    /// - `Ok(SecretConfig)`: Successfully loaded secrets (possibly empty)
    /// - `Err(String)`: Failed to load (message contains no secret material)
    async fn load_secrets(&self) -> Result<SecretConfig, String>;

    /// Key supplied by the environment, consulted after user and file keys.
    fn environment_key(&self) -> Option<String>;
}
