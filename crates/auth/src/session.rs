//! Local freshness check for sessions handed out by the identity service.
//!
//! The id token stays opaque here; only the service can verify it. What the
//! dashboard can check is the lifetime the service reported at sign-in.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use admindash_gateway::Session;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("signed-in session ended at {ended_at}; please log in again")]
    Expired { ended_at: DateTime<Utc> },

    #[error("session starts at {issued_at}, ahead of this device's clock")]
    IssuedInFuture { issued_at: DateTime<Utc> },

    #[error("identity service issued a session with no lifetime")]
    NoLifetime,
}

/// Time left on `session` at `now`.
pub fn remaining_lifetime(session: &Session, now: DateTime<Utc>) -> Result<Duration, SessionError> {
    if session.expires_at - session.issued_at <= Duration::zero() {
        return Err(SessionError::NoLifetime);
    }
    if now < session.issued_at {
        return Err(SessionError::IssuedInFuture {
            issued_at: session.issued_at,
        });
    }
    let left = session.expires_at - now;
    if left <= Duration::zero() {
        return Err(SessionError::Expired {
            ended_at: session.expires_at,
        });
    }
    Ok(left)
}
