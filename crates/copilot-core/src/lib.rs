//! Domain layer of the integration co-pilot.
//!
//! Everything here is free of I/O: prompt construction, intent routing,
//! result extraction, credential handling and the trait the network client
//! implements.

pub mod backend;
pub mod config;
pub mod credentials;
pub mod error;
pub mod extract;
pub mod intent;
pub mod platform;
pub mod prompt;
pub mod result;
pub mod secret;
pub mod session;

pub use backend::{GenerativeBackend, ModelId, ProbeOutcome, RawProbeResponse};
pub use error::{PipelineError, PipelineErrorKind, Result};
pub use platform::Platform;
pub use result::StructuredResult;
