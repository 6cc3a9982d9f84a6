//! Document collections: the CRUD surface every screen talks to.

use std::sync::Arc;

use async_trait::async_trait;

use admindash_core::{Fields, Record, RecordId};

use crate::error::GatewayError;
use crate::subscription::Subscription;

/// Remote collection store.
///
/// Each call is a single independent round trip: no batching, no retries.
/// Identifiers are minted here on create and never by the caller. Ordering of
/// `read_all_records` is whatever the backend returns.
#[async_trait]
pub trait CollectionGateway: Send + Sync {
    /// Store a new record and return the id the backend assigned to it.
    async fn create_record(&self, collection: &str, fields: Fields) -> Result<RecordId, GatewayError>;

    async fn read_all_records(&self, collection: &str) -> Result<Vec<Record>, GatewayError>;

    /// Overwrite exactly the keys in `patch`; other fields are untouched.
    ///
    /// Fails with `GatewayError::NotFound` when `id` no longer exists.
    async fn update_record(
        &self,
        collection: &str,
        id: &RecordId,
        patch: Fields,
    ) -> Result<(), GatewayError>;

    /// Fails with `GatewayError::NotFound` when `id` does not exist.
    async fn delete_record(&self, collection: &str, id: &RecordId) -> Result<(), GatewayError>;

    /// Register a push listener. The first snapshot is the current collection.
    async fn subscribe_to_collection(&self, collection: &str) -> Result<Subscription, GatewayError>;
}

#[async_trait]
impl<G> CollectionGateway for Arc<G>
where
    G: CollectionGateway + ?Sized,
{
    async fn create_record(&self, collection: &str, fields: Fields) -> Result<RecordId, GatewayError> {
        (**self).create_record(collection, fields).await
    }

    async fn read_all_records(&self, collection: &str) -> Result<Vec<Record>, GatewayError> {
        (**self).read_all_records(collection).await
    }

    async fn update_record(
        &self,
        collection: &str,
        id: &RecordId,
        patch: Fields,
    ) -> Result<(), GatewayError> {
        (**self).update_record(collection, id, patch).await
    }

    async fn delete_record(&self, collection: &str, id: &RecordId) -> Result<(), GatewayError> {
        (**self).delete_record(collection, id).await
    }

    async fn subscribe_to_collection(&self, collection: &str) -> Result<Subscription, GatewayError> {
        (**self).subscribe_to_collection(collection).await
    }
}
