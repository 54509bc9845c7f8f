//! HTTP request handlers for all API endpoints.
//!
//! Handlers never check credentials themselves. The routes in [`crate::build_router`] are
//! wrapped in [`crate::auth::middleware::require_auth`], and handlers read the authenticated
//! principal through [`crate::auth::current_user`].
//!
//! - [`auth`]: Password check via `/login`
//! - [`notifications`]: The caller's notifications
//! - [`sessions`]: Issue, inspect and revoke session API keys
//! - [`status`]: Host and process information
//! - [`users`]: User CRUD
//!
//! Handlers return [`crate::errors::Error`], which renders as the JSON error envelope.

pub mod auth;
pub mod notifications;
pub mod sessions;
pub mod status;
pub mod users;
