//! `admindash-core`: domain building blocks shared by every dashboard screen.
//!
//! This crate contains **pure domain** primitives (no IO, no gateway concerns):
//! gateway-assigned identifiers, scalar field values, per-entity field schemas,
//! the `Entity` trait that ties a typed record to its remote collection, and the
//! notice queue screens use to report outcomes.

pub mod entity;
pub mod error;
pub mod id;
pub mod notice;
pub mod record;
pub mod schema;
pub mod value;

pub use entity::{Entity, Stored, SyncMode};
pub use error::{DomainError, DomainResult};
pub use id::RecordId;
pub use notice::{Notice, NoticeLevel, Notices};
pub use record::Record;
pub use schema::{FieldDefault, FieldKind, FieldSpec};
pub use value::{FieldValue, Fields};
