//! Password sign-in against the backend's identity service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// An authenticated session as issued by the backend.
///
/// The token is opaque to the dashboard; it is only forwarded on later calls.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Backend-side account id.
    pub user_id: String,
    pub email: String,
    pub id_token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl core::fmt::Debug for Session {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("id_token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange email + password for a session. Wrong credentials are
    /// `GatewayError::Auth`.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, GatewayError>;
}

#[async_trait]
impl<A> AuthGateway for Arc<A>
where
    A: AuthGateway + ?Sized,
{
    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        (**self).authenticate(email, password).await
    }
}
