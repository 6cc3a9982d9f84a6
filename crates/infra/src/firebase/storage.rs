//! File storage: media upload and download URLs.

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;

use admindash_gateway::{BlobStore, GatewayError};

use super::{CallKind, FirebaseBackend, failure, status_error, transport_error};
use crate::config::BackendConfig;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    name: String,
    /// Comma-separated; the first one is used.
    download_tokens: Option<String>,
}

fn objects_url(config: &BackendConfig) -> Result<Url, GatewayError> {
    let raw = format!("{}/b/{}/o", config.endpoints.storage, config.storage_bucket);
    Url::parse(&raw).map_err(|e| GatewayError::storage(format!("bad endpoint {raw}: {e}")))
}

pub(super) fn upload_url(config: &BackendConfig, path: &str) -> Result<Url, GatewayError> {
    let mut url = objects_url(config)?;
    url.query_pairs_mut()
        .append_pair("uploadType", "media")
        .append_pair("name", path);
    Ok(url)
}

/// Public URL for an object; the whole object path is one encoded segment.
pub(super) fn download_url(config: &BackendConfig, path: &str, token: &str) -> Result<Url, GatewayError> {
    let mut url = objects_url(config)?;
    url.path_segments_mut()
        .map_err(|()| GatewayError::storage("storage endpoint cannot take a path"))?
        .push(path);
    url.query_pairs_mut()
        .append_pair("alt", "media")
        .append_pair("token", token);
    Ok(url)
}

#[async_trait]
impl BlobStore for FirebaseBackend {
    async fn upload_binary(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GatewayError> {
        let size = bytes.len();
        let response = self
            .authorized(self.http().post(upload_url(self.config(), path)?))
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            let (status, message) = failure(response).await;
            return Err(status_error(CallKind::Storage, status, message));
        }

        let stored: UploadResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::storage(format!("unreadable upload response: {e}")))?;
        let token = stored
            .download_tokens
            .as_deref()
            .and_then(|t| t.split(',').next())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GatewayError::storage(format!("{} has no download token", stored.name)))?;

        let url = download_url(self.config(), &stored.name, token)?;
        tracing::debug!(path, size, "uploaded object");
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BackendConfig {
        BackendConfig::from_lookup(|key| match key {
            "ADMINDASH_STORAGE_BUCKET" => Some("demo.appspot.com".into()),
            k if k.starts_with("ADMINDASH_") && !k.ends_with("_MS") && !k.ends_with("_URL") => {
                Some("x".into())
            }
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn upload_names_object_in_query() {
        let url = upload_url(&config(), "photos/cat 1.png").unwrap();
        assert_eq!(
            url.as_str(),
            "https://firebasestorage.googleapis.com/v0/b/demo.appspot.com/o?uploadType=media&name=photos%2Fcat+1.png"
        );
    }

    #[test]
    fn download_url_encodes_object_path_as_one_segment() {
        let url = download_url(&config(), "photos/cat.png", "tok").unwrap();
        assert_eq!(
            url.as_str(),
            "https://firebasestorage.googleapis.com/v0/b/demo.appspot.com/o/photos%2Fcat.png?alt=media&token=tok"
        );
    }
}
