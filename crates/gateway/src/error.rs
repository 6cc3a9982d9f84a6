use thiserror::Error;

/// Failure reported by the managed backend (or the transport to it).
///
/// Every variant is transient from the dashboard's point of view: it is shown
/// to the user once and the operation is abandoned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The backend could not be reached (network, timeout, 5xx).
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("read rejected: {0}")]
    Read(String),

    #[error("write rejected: {0}")]
    Write(String),

    /// The addressed record does not exist (update/delete of a stale id).
    #[error("{collection}/{id} does not exist")]
    NotFound { collection: String, id: String },

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("file storage rejected: {0}")]
    Storage(String),

    /// A push subscription ended on the backend side.
    #[error("subscription closed")]
    Closed,
}

impl GatewayError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn read(msg: impl Into<String>) -> Self {
        Self::Read(msg.into())
    }

    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
