//! Common type definitions.
//!
//! All entity IDs are SQLite rowids wrapped in type aliases:
//!
//! - [`UserId`]: User account identifier
//! - [`SessionId`]: Session (API key) identifier
//! - [`NotificationId`]: Notification identifier

pub type UserId = i64;
pub type SessionId = i64;
pub type NotificationId = i64;
