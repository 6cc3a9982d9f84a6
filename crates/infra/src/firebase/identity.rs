//! Email/password sign-in.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use admindash_gateway::{AuthGateway, GatewayError, Session};

use super::{CallKind, FirebaseBackend, failure, status_error, transport_error};

/// Lifetime assumed when the response omits `expiresIn`.
const DEFAULT_TOKEN_SECS: i64 = 3600;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
    id_token: String,
    /// Seconds, as a decimal string.
    expires_in: Option<String>,
}

impl SignInResponse {
    fn into_session(self) -> Session {
        let secs = self
            .expires_in
            .as_deref()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_TOKEN_SECS);
        let issued_at = Utc::now();
        Session {
            user_id: self.local_id,
            email: self.email,
            id_token: self.id_token,
            issued_at,
            expires_at: issued_at + Duration::seconds(secs),
        }
    }
}

#[async_trait]
impl AuthGateway for FirebaseBackend {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let raw = format!("{}/accounts:signInWithPassword", self.config().endpoints.identity);
        let url = Url::parse(&raw)
            .map_err(|e| GatewayError::unavailable(format!("bad endpoint {raw}: {e}")))?;
        let url = self.with_key(url);

        let response = self
            .http()
            .post(url)
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            let (status, message) = failure(response).await;
            return Err(status_error(CallKind::Auth, status, message));
        }

        let body: SignInResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::auth(format!("unreadable sign-in response: {e}")))?;
        let session = body.into_session();
        self.set_token(session.id_token.clone());
        tracing::info!(user_id = %session.user_id, "identity service accepted sign-in");
        Ok(session)
    }
}
