//! Backend configuration loaded from the environment.
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `ADMINDASH_API_KEY` | yes | |
//! | `ADMINDASH_AUTH_DOMAIN` | yes | |
//! | `ADMINDASH_PROJECT_ID` | yes | |
//! | `ADMINDASH_STORAGE_BUCKET` | yes | |
//! | `ADMINDASH_MESSAGING_SENDER_ID` | yes | |
//! | `ADMINDASH_APP_ID` | yes | |
//! | `ADMINDASH_MEASUREMENT_ID` | no | |
//! | `ADMINDASH_POLL_INTERVAL_MS` | no | 2000 |
//! | `ADMINDASH_REQUEST_TIMEOUT_MS` | no | 10000 |
//! | `ADMINDASH_FIRESTORE_URL` | no | public endpoint |
//! | `ADMINDASH_IDENTITY_URL` | no | public endpoint |
//! | `ADMINDASH_STORAGE_URL` | no | public endpoint |
//!
//! The URL overrides exist for local emulators.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_STORAGE_URL: &str = "https://firebasestorage.googleapis.com/v0";

const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Base URLs of the three backend services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub firestore: String,
    pub identity: String,
    pub storage: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            firestore: DEFAULT_FIRESTORE_URL.to_string(),
            identity: DEFAULT_IDENTITY_URL.to_string(),
            storage: DEFAULT_STORAGE_URL.to_string(),
        }
    }
}

/// Project settings for the hosted backend.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    pub measurement_id: Option<String>,
    /// How often polled subscriptions re-read their collection.
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub endpoints: Endpoints,
}

impl core::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_key", &"<redacted>")
            .field("auth_domain", &self.auth_domain)
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("app_id", &self.app_id)
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl BackendConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (environment, file, test map).
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let millis = |key: &'static str, default: u64| -> Result<Duration, ConfigError> {
            let Some(raw) = get(key) else {
                return Ok(Duration::from_millis(default));
            };
            match raw.parse::<u64>() {
                Ok(0) => Err(ConfigError::Invalid {
                    key,
                    value: raw,
                    reason: "must be greater than zero".into(),
                }),
                Ok(ms) => Ok(Duration::from_millis(ms)),
                Err(e) => Err(ConfigError::Invalid {
                    key,
                    value: raw,
                    reason: e.to_string(),
                }),
            }
        };
        let url = |key: &'static str, default: &str| -> Result<String, ConfigError> {
            let raw = get(key).unwrap_or_else(|| default.to_string());
            if !(raw.starts_with("http://") || raw.starts_with("https://")) {
                return Err(ConfigError::Invalid {
                    key,
                    value: raw,
                    reason: "expected an http(s) URL".into(),
                });
            }
            Ok(raw.trim_end_matches('/').to_string())
        };

        Ok(Self {
            api_key: required("ADMINDASH_API_KEY")?,
            auth_domain: required("ADMINDASH_AUTH_DOMAIN")?,
            project_id: required("ADMINDASH_PROJECT_ID")?,
            storage_bucket: required("ADMINDASH_STORAGE_BUCKET")?,
            messaging_sender_id: required("ADMINDASH_MESSAGING_SENDER_ID")?,
            app_id: required("ADMINDASH_APP_ID")?,
            measurement_id: get("ADMINDASH_MEASUREMENT_ID"),
            poll_interval: millis("ADMINDASH_POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?,
            request_timeout: millis("ADMINDASH_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS)?,
            endpoints: Endpoints {
                firestore: url("ADMINDASH_FIRESTORE_URL", DEFAULT_FIRESTORE_URL)?,
                identity: url("ADMINDASH_IDENTITY_URL", DEFAULT_IDENTITY_URL)?,
                storage: url("ADMINDASH_STORAGE_URL", DEFAULT_STORAGE_URL)?,
            },
        })
    }

    /// Root of the project's default document database.
    pub fn documents_root(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.endpoints.firestore, self.project_id
        )
    }
}
