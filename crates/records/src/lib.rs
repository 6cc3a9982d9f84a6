//! `admindash-records`: the record shapes managed by the dashboard.
//!
//! One module per collection. Each type implements `admindash_core::Entity`,
//! which fixes its collection name, field schema and sync mode.

pub mod album;
pub mod comment;
pub mod photo;
pub mod post;
pub mod todo;
pub mod user;

pub use album::Album;
pub use comment::Comment;
pub use photo::Photo;
pub use post::Post;
pub use todo::Todo;
pub use user::User;
