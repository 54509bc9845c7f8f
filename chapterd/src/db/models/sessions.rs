//! Database models for sessions.

use crate::types::{SessionId, UserId};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Database request for creating a new session
#[derive(Debug, Clone)]
pub struct SessionCreateDBRequest {
    pub user_id: UserId,
    pub key: String,
    pub expires_at: DateTime<Utc>,
}

/// Database request for updating a session
#[derive(Debug, Clone)]
pub struct SessionUpdateDBRequest {
    pub expires_at: DateTime<Utc>,
}

/// Database response for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDBResponse {
    pub id: SessionId,
    pub user_id: UserId,
    pub key: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionDBResponse {
    /// A session is usable strictly before its expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Expiry for a session used at `now`, or `None` when it lies beyond the representable range.
pub fn expiry_after(now: DateTime<Utc>, duration: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(duration).ok().and_then(|d| now.checked_add_signed(d))
}
