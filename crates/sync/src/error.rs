use thiserror::Error;

use admindash_core::DomainError;
use admindash_gateway::GatewayError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Rejected locally before any network call; fix the form and retry.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The collection could not be read; the view model kept its previous value.
    #[error("collection unavailable: {0}")]
    GatewayUnavailable(#[source] GatewayError),

    /// A create/update/delete was rejected (including stale ids).
    #[error("write rejected: {0}")]
    GatewayWrite(#[source] GatewayError),

    #[error("upload rejected: {0}")]
    Storage(#[source] GatewayError),

    /// The gateway returned a record that does not fit the entity's shape.
    #[error("unexpected record shape: {0}")]
    Schema(String),

    /// The owning screen was torn down; no state was touched.
    #[error("screen was torn down")]
    Detached,
}

impl SyncError {
    /// Local failures never reached the network.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Detached)
    }
}

impl From<DomainError> for SyncError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Schema(m) => Self::Schema(m),
            DomainError::Validation(m) | DomainError::InvalidId(m) => Self::Validation(m),
        }
    }
}
