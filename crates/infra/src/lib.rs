//! Infrastructure layer: backend configuration and the hosted backend client.

pub mod config;
pub mod firebase;

pub use config::{BackendConfig, ConfigError, Endpoints};
pub use firebase::FirebaseBackend;
