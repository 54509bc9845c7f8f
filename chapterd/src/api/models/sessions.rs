//! API response models for sessions.

use crate::db::models::sessions::SessionDBResponse;
use crate::types::{SessionId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A session as returned by the API.
///
/// `key` is the secret to send as `Authorization: Basic base64(username:key)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: SessionId,
    pub user_id: UserId,
    pub key: String,
    /// Expiry as a Unix timestamp in seconds
    pub expires: i64,
}

impl From<SessionDBResponse> for SessionResponse {
    fn from(db: SessionDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            key: db.key,
            expires: db.expires_at.timestamp(),
        }
    }
}

/// Envelope for session responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionEnvelope {
    pub session: SessionResponse,
}

impl From<SessionDBResponse> for SessionEnvelope {
    fn from(db: SessionDBResponse) -> Self {
        Self { session: db.into() }
    }
}
