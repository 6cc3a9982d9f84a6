//! `admindash-sync`
//!
//! **Responsibility:** the "list + mutate + resync" pattern every dashboard
//! screen follows, implemented once and instantiated per entity type.
//!
//! This crate provides:
//! - `ViewModel`: in-memory mirror of one remote collection (a cache, never
//!   the authority)
//! - `SyncController`: load / subscribe / create / update / delete against the
//!   gateway, reconciling the view model after each call
//! - `FormController`: the create/edit modal state machine with its
//!   duplicate-submit guard
//! - `Screen`: mount/teardown scope tying the two together
//! - `ImageUpload`: file upload followed by a photo record
//!
//! Presentation (widgets, layout, routing) is not part of this crate.

pub mod controller;
pub mod error;
pub mod form;
pub mod screen;
pub mod screens;
pub mod upload;
pub mod view_model;

pub use controller::SyncController;
pub use error::SyncError;
pub use form::{FormController, FormMode, SubmitOutcome, Submission};
pub use screen::Screen;
pub use upload::{ImageUpload, SelectedFile};
pub use view_model::ViewModel;
