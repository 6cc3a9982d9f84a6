//! The login screen's controller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use admindash_core::{Notice, Notices};
use admindash_gateway::{AuthGateway, GatewayError, Session};

use crate::session::{SessionError, remaining_lifetime};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Rejected locally; the identity service was not called.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("sign-in rejected: {0}")]
    Rejected(#[source] GatewayError),

    #[error("not signed in")]
    NotSignedIn,

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Holds the signed-in session (if any) and gates dashboard entry on it.
#[derive(Debug)]
pub struct LoginGate<A: ?Sized> {
    auth: Arc<A>,
    session: Option<Session>,
    loading: bool,
    notices: Notices,
}

impl<A> LoginGate<A>
where
    A: AuthGateway + ?Sized,
{
    pub fn new(auth: Arc<A>) -> Self {
        Self {
            auth,
            session: None,
            loading: false,
            notices: Notices::new(),
        }
    }

    /// Sign in with email and password.
    ///
    /// Blank credentials are rejected before any network call. A failed
    /// sign-in leaves any previous session untouched.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            self.notices.push(Notice::warning("Please enter your email and password"));
            return Err(AuthError::Validation("email and password are required".into()));
        }

        self.loading = true;
        let result = self.auth.authenticate(email, password).await;
        self.loading = false;

        match result {
            Ok(session) => {
                tracing::info!(user_id = %session.user_id, "signed in");
                self.notices.push(Notice::success("Login successful!"));
                Ok(self.session.insert(session))
            }
            Err(err) => {
                tracing::warn!(error = %err, "sign-in failed");
                let message = match &err {
                    GatewayError::Auth(_) => "Invalid email or password. Please try again.",
                    _ => "Could not reach the sign-in service. Please try again.",
                };
                self.notices.push(Notice::error(message));
                Err(AuthError::Rejected(err))
            }
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The session, if one exists and is valid at `now`.
    pub fn require_session(&self, now: DateTime<Utc>) -> Result<&Session, AuthError> {
        let session = self.session.as_ref().ok_or(AuthError::NotSignedIn)?;
        remaining_lifetime(session, now)?;
        Ok(session)
    }

    pub fn is_signed_in(&self, now: DateTime<Utc>) -> bool {
        self.require_session(now).is_ok()
    }

    pub fn sign_out(&mut self) -> Option<Session> {
        let session = self.session.take();
        if let Some(s) = &session {
            tracing::info!(user_id = %s.user_id, "signed out");
        }
        session
    }

    /// True while a sign-in request is in flight.
    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn notices(&mut self) -> &mut Notices {
        &mut self.notices
    }
}
