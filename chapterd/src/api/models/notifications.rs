//! API response models for notifications.

use crate::db::models::notifications::NotificationDBResponse;
use crate::types::{NotificationId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: NotificationId,
    pub user_id: UserId,
    /// Creation time as a Unix timestamp in seconds
    pub timestamp: i64,
    pub read: bool,
    pub text: String,
    pub uri: String,
}

impl From<NotificationDBResponse> for NotificationResponse {
    fn from(db: NotificationDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            timestamp: db.created_at.timestamp(),
            read: db.read,
            text: db.text,
            uri: db.uri,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationResponse>,
}
