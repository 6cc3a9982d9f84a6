//! `admindash-gateway`: the managed backend as the dashboard consumes it.
//!
//! The backend (documents, auth, files) is an opaque external collaborator.
//! This crate only states the contract the dashboard relies on, plus an
//! in-memory implementation used by tests and local development.

pub mod auth;
pub mod blob;
pub mod collection;
pub mod error;
pub mod memory;
pub mod subscription;

pub use auth::{AuthGateway, Session};
pub use blob::BlobStore;
pub use collection::CollectionGateway;
pub use error::GatewayError;
pub use memory::{CallCounts, Faults, InMemoryBackend};
pub use subscription::{Snapshot, SnapshotSender, Subscription};
