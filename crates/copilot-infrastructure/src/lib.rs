//! File-system backed services: paths, configuration, secrets and the
//! platform credential store.

pub mod config_service;
pub mod credential_store;
pub mod paths;
pub mod secret_service;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::credential_store::FileCredentialStore;
pub use crate::paths::CopilotPaths;
pub use crate::secret_service::SecretServiceImpl;
