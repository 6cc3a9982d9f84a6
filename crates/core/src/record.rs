//! Untyped records as they cross the gateway boundary.

use serde::{Deserialize, Serialize};

use crate::id::RecordId;
use crate::value::Fields;

/// A record read from a remote collection: gateway id plus raw fields.
///
/// Typed code should decode this into `Stored<E>` right at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub fields: Fields,
}

impl Record {
    pub fn new(id: RecordId, fields: Fields) -> Self {
        Self { id, fields }
    }
}
