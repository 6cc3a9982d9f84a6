//! Entity trait: a typed record bound to one remote collection.

use crate::error::{DomainError, DomainResult};
use crate::id::RecordId;
use crate::record::Record;
use crate::schema::FieldSpec;
use crate::value::Fields;

/// How a screen keeps its view model fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Re-read the collection on demand.
    Poll,
    /// Register a push listener; every snapshot replaces the view model.
    Push,
}

/// A typed record shape, checked at the gateway boundary.
///
/// The entity itself carries no identifier: ids belong to the gateway and are
/// attached by `Stored` once a record has been read back or created.
pub trait Entity: Clone + core::fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Remote collection name.
    const COLLECTION: &'static str;

    /// Human-readable singular name used in notices ("Post added successfully").
    const LABEL: &'static str;

    const SCHEMA: &'static [FieldSpec];

    const SYNC: SyncMode = SyncMode::Poll;

    fn from_fields(fields: &Fields) -> DomainResult<Self>;

    fn to_fields(&self) -> Fields;
}

/// An entity together with its gateway-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<E> {
    pub id: RecordId,
    pub data: E,
}

impl<E: Entity> Stored<E> {
    pub fn new(id: RecordId, data: E) -> Self {
        Self { id, data }
    }

    /// Decode a raw record, naming the collection and id on failure.
    pub fn decode(record: &Record) -> DomainResult<Self> {
        let data = E::from_fields(&record.fields).map_err(|e| {
            DomainError::schema(format!("{}/{}: {}", E::COLLECTION, record.id, e.message()))
        })?;
        Ok(Self::new(record.id.clone(), data))
    }

    /// The entity as it would look after applying `patch`.
    pub fn patched(&self, patch: &Fields) -> DomainResult<E> {
        let mut fields = self.data.to_fields();
        fields.merge(patch);
        E::from_fields(&fields)
    }
}
