//! Database models for notifications.

use crate::types::{NotificationId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a new notification
#[derive(Debug, Clone)]
pub struct NotificationCreateDBRequest {
    pub user_id: UserId,
    pub text: String,
    pub uri: String,
}

/// Database response for a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDBResponse {
    pub id: NotificationId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    pub text: String,
    pub uri: String,
}
