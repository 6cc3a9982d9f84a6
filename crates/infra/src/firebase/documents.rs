//! Document database: the collection gateway.

use async_trait::async_trait;
use reqwest::Url;

use admindash_core::{Fields, Record, RecordId};
use admindash_gateway::{CollectionGateway, GatewayError, Subscription};

use super::codec::{ListPage, WireDocument, WriteBody, decode_document, document_id, field_path};
use super::{CallKind, FirebaseBackend, failure, status_error, transport_error};
use crate::config::BackendConfig;

const PAGE_SIZE: &str = "300";

pub(super) fn collection_url(config: &BackendConfig, collection: &str) -> Result<Url, GatewayError> {
    let raw = format!("{}/{collection}", config.documents_root());
    Url::parse(&raw).map_err(|e| GatewayError::unavailable(format!("bad endpoint {raw}: {e}")))
}

pub(super) fn document_url(
    config: &BackendConfig,
    collection: &str,
    id: &RecordId,
) -> Result<Url, GatewayError> {
    let mut url = collection_url(config, collection)?;
    url.path_segments_mut()
        .map_err(|()| GatewayError::unavailable("document endpoint cannot take a path"))?
        .push(id.as_str());
    Ok(url)
}

/// Patch URL: only the patched keys are written, and the document must exist.
pub(super) fn patch_url(
    config: &BackendConfig,
    collection: &str,
    id: &RecordId,
    patch: &Fields,
) -> Result<Url, GatewayError> {
    let mut url = document_url(config, collection, id)?;
    {
        let mut query = url.query_pairs_mut();
        for name in patch.names() {
            query.append_pair("updateMask.fieldPaths", &field_path(name));
        }
        query.append_pair("currentDocument.exists", "true");
    }
    Ok(url)
}

impl FirebaseBackend {
    /// Read every document of `collection`, following page tokens.
    pub(super) async fn list_documents(&self, collection: &str) -> Result<Vec<Record>, GatewayError> {
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut url = collection_url(self.config(), collection)?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", PAGE_SIZE);
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }
            let url = self.with_key(url);

            let response = self
                .authorized(self.http().get(url))
                .send()
                .await
                .map_err(transport_error)?;
            if !response.status().is_success() {
                let (status, message) = failure(response).await;
                return Err(status_error(CallKind::Read, status, message));
            }
            let page: ListPage = response
                .json()
                .await
                .map_err(|e| GatewayError::read(format!("unreadable listing: {e}")))?;

            for doc in &page.documents {
                records.push(decode_document(doc)?);
            }
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }
        tracing::debug!(collection, count = records.len(), "listed documents");
        Ok(records)
    }
}

#[async_trait]
impl CollectionGateway for FirebaseBackend {
    async fn create_record(&self, collection: &str, fields: Fields) -> Result<RecordId, GatewayError> {
        let url = self.with_key(collection_url(self.config(), collection)?);
        let response = self
            .authorized(self.http().post(url))
            .json(&WriteBody::new(&fields))
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            let (status, message) = failure(response).await;
            return Err(status_error(CallKind::Write, status, message));
        }

        let doc: WireDocument = response
            .json()
            .await
            .map_err(|e| GatewayError::write(format!("unreadable create response: {e}")))?;
        let id = document_id(&doc.name)?;
        tracing::debug!(collection, %id, "created document");
        Ok(id)
    }

    async fn read_all_records(&self, collection: &str) -> Result<Vec<Record>, GatewayError> {
        self.list_documents(collection).await
    }

    async fn update_record(
        &self,
        collection: &str,
        id: &RecordId,
        patch: Fields,
    ) -> Result<(), GatewayError> {
        let url = self.with_key(patch_url(self.config(), collection, id, &patch)?);
        let response = self
            .authorized(self.http().patch(url))
            .json(&WriteBody::new(&patch))
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            let (status, message) = failure(response).await;
            let target = CallKind::Target { collection, id: id.as_str() };
            return Err(status_error(target, status, message));
        }
        tracing::debug!(collection, %id, keys = patch.len(), "patched document");
        Ok(())
    }

    async fn delete_record(&self, collection: &str, id: &RecordId) -> Result<(), GatewayError> {
        let mut url = document_url(self.config(), collection, id)?;
        url.query_pairs_mut().append_pair("currentDocument.exists", "true");
        let url = self.with_key(url);

        let response = self
            .authorized(self.http().delete(url))
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            let (status, message) = failure(response).await;
            let target = CallKind::Target { collection, id: id.as_str() };
            return Err(status_error(target, status, message));
        }
        tracing::debug!(collection, %id, "deleted document");
        Ok(())
    }

    async fn subscribe_to_collection(&self, collection: &str) -> Result<Subscription, GatewayError> {
        let (tx, subscription) = Subscription::channel(collection);
        super::poll::spawn(self.clone(), collection.to_string(), tx);
        tracing::debug!(collection, every = ?self.config().poll_interval, "polling collection");
        Ok(subscription)
    }
}
