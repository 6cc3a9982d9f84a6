//! `admindash-auth`: login gate in front of the dashboard.
//!
//! Credentials are exchanged with the backend's identity service once, at
//! login; the resulting session gates entry to every other screen.

pub mod login;
pub mod session;

pub use login::{AuthError, LoginGate};
pub use session::{SessionError, remaining_lifetime};

pub use admindash_gateway::Session;
