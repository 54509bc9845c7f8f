//! API request and response data models.
//!
//! API models are distinct from database models so the wire format (camelCase, no password
//! hashes, Unix timestamps) can evolve independently of storage.

pub mod notifications;
pub mod sessions;
pub mod status;
pub mod users;
