//! Hosted backend client over its public REST APIs.
//!
//! - documents: list (paged), create, field-masked patch, delete
//! - identity: email/password sign-in
//! - storage: media upload plus token download URL
//!
//! Push subscriptions are emulated by polling (see `poll`). Calls made after a
//! successful sign-in carry the session's id token.

mod codec;
mod documents;
mod identity;
mod poll;
mod storage;

use std::sync::{Arc, RwLock};

use anyhow::Context;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;

use admindash_gateway::GatewayError;

use crate::config::BackendConfig;

pub use codec::{decode_document, encode_fields, field_path};

/// Client for one backend project. Cheap to clone; clones share the HTTP
/// connection pool and the signed-in token.
#[derive(Clone)]
pub struct FirebaseBackend {
    inner: Arc<Inner>,
}

struct Inner {
    config: BackendConfig,
    http: reqwest::Client,
    id_token: RwLock<Option<String>>,
}

impl core::fmt::Debug for FirebaseBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FirebaseBackend")
            .field("config", &self.inner.config)
            .field("signed_in", &self.signed_in())
            .finish()
    }
}

impl FirebaseBackend {
    pub fn new(config: BackendConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::unavailable(format!("http client: {e}")))?;
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                http,
                id_token: RwLock::new(None),
            }),
        })
    }

    /// Configure from `ADMINDASH_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = BackendConfig::from_env().context("loading backend configuration")?;
        tracing::info!(project = %config.project_id, "backend configured");
        Self::new(config).context("building backend client")
    }

    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    pub fn signed_in(&self) -> bool {
        self.inner
            .id_token
            .read()
            .map(|t| t.is_some())
            .unwrap_or(false)
    }

    /// Forget the session token; later calls go out unauthenticated.
    pub fn sign_out(&self) {
        if let Ok(mut token) = self.inner.id_token.write() {
            *token = None;
        }
    }

    fn set_token(&self, token: String) {
        if let Ok(mut current) = self.inner.id_token.write() {
            *current = Some(token);
        }
    }

    fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Attach the session token, if any.
    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.inner.id_token.read().ok().and_then(|t| t.clone());
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn with_key(&self, mut url: Url) -> Url {
        url.query_pairs_mut().append_pair("key", &self.inner.config.api_key);
        url
    }
}

/// Error envelope shared by all three services.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a non-success response into its status plus the backend's message.
async fn failure(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body
            }
        });
    (status, message)
}

/// Which kind of call failed, to pick the error variant.
#[derive(Debug, Clone, Copy)]
enum CallKind<'a> {
    Read,
    Write,
    /// Update/delete of one document.
    Target { collection: &'a str, id: &'a str },
    Auth,
    Storage,
}

fn status_error(kind: CallKind<'_>, status: StatusCode, message: String) -> GatewayError {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return GatewayError::unavailable(format!("{status}: {message}"));
    }
    match (kind, status) {
        (CallKind::Auth, _) => GatewayError::auth(message),
        (_, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => GatewayError::auth(message),
        (CallKind::Target { collection, id }, StatusCode::NOT_FOUND) => {
            GatewayError::not_found(collection, id)
        }
        (CallKind::Read, _) => GatewayError::read(message),
        (CallKind::Write | CallKind::Target { .. }, _) => GatewayError::write(message),
        (CallKind::Storage, _) => GatewayError::storage(message),
    }
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    GatewayError::unavailable(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> FirebaseBackend {
        let config = BackendConfig::from_lookup(|key| {
            key.strip_prefix("ADMINDASH_")
                .filter(|rest| !rest.ends_with("_MS") && !rest.ends_with("_URL"))
                .map(|rest| format!("test-{}", rest.to_lowercase()))
        })
        .unwrap();
        FirebaseBackend::new(config).unwrap()
    }

    #[test]
    fn clones_share_the_session_token() {
        let backend = backend();
        let clone = backend.clone();
        assert!(!clone.signed_in());

        backend.set_token("tok".into());
        assert!(clone.signed_in());

        clone.sign_out();
        assert!(!backend.signed_in());
    }

    #[test]
    fn requests_carry_the_api_key() {
        let backend = backend();
        let url = backend.with_key(Url::parse("https://example.test/x").unwrap());
        assert_eq!(url.as_str(), "https://example.test/x?key=test-api_key");
        assert!(!format!("{backend:?}").contains("test-api_key"));
    }

    #[test]
    fn statuses_map_to_gateway_errors() {
        let target = CallKind::Target { collection: "todos", id: "a" };

        assert_eq!(
            status_error(target, StatusCode::NOT_FOUND, "No document to update".into()),
            GatewayError::not_found("todos", "a")
        );
        assert!(matches!(
            status_error(CallKind::Read, StatusCode::FORBIDDEN, "denied".into()),
            GatewayError::Auth(_)
        ));
        assert!(matches!(
            status_error(CallKind::Write, StatusCode::SERVICE_UNAVAILABLE, "down".into()),
            GatewayError::Unavailable(_)
        ));
        assert_eq!(
            status_error(CallKind::Auth, StatusCode::BAD_REQUEST, "INVALID_LOGIN_CREDENTIALS".into()),
            GatewayError::auth("INVALID_LOGIN_CREDENTIALS")
        );
        assert!(matches!(
            status_error(CallKind::Storage, StatusCode::BAD_REQUEST, "bad".into()),
            GatewayError::Storage(_)
        ));
    }
}
