//! Database record structures.
//!
//! Each entity has a create request, an optional update request and a response type. API
//! models in [`crate::api::models`] convert to and from these.

pub mod notifications;
pub mod sessions;
pub mod users;
