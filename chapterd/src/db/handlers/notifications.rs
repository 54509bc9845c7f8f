//! Database repository for notifications.

use crate::db::{errors::Result, models::notifications::{NotificationCreateDBRequest, NotificationDBResponse}};
use crate::types::{NotificationId, UserId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub message: String,
    pub uri: String,
}

impl From<Notification> for NotificationDBResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            user_id: notification.user_id,
            created_at: notification.created_at,
            read: notification.is_read,
            text: notification.message,
            uri: notification.uri,
        }
    }
}

pub struct Notifications<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Notifications<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(user_id = request.user_id), err)]
    pub async fn create(&mut self, request: &NotificationCreateDBRequest) -> Result<NotificationDBResponse> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (user_id, created_at, is_read, message, uri)
            VALUES (?, ?, 0, ?, ?)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(Utc::now())
        .bind(&request.text)
        .bind(&request.uri)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(NotificationDBResponse::from(notification))
    }

    /// Notifications addressed to a user, newest first.
    #[instrument(skip(self), err)]
    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<NotificationDBResponse>> {
        let notifications = sqlx::query_as::<_, Notification>("SELECT * FROM notifications WHERE user_id = ? ORDER BY id DESC")
            .bind(user_id)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(notifications.into_iter().map(NotificationDBResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::{Repository, Users};
    use crate::test_utils::{create_test_pool, user_request};

    #[tokio::test]
    async fn test_notifications_are_scoped_to_user() {
        let pool = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let alice = Users::new(&mut conn).create(&user_request("alice")).await.unwrap();
        let bob = Users::new(&mut conn).create(&user_request("bob")).await.unwrap();

        let mut repo = Notifications::new(&mut conn);
        for (user_id, text) in [(alice.id, "first"), (alice.id, "second"), (bob.id, "for bob")] {
            repo.create(&NotificationCreateDBRequest {
                user_id,
                text: text.to_string(),
                uri: "/events/1".to_string(),
            })
            .await
            .unwrap();
        }

        let alice_notes = repo.list_for_user(alice.id).await.unwrap();
        assert_eq!(alice_notes.len(), 2);
        assert_eq!(alice_notes[0].text, "second");
        assert!(alice_notes.iter().all(|n| n.user_id == alice.id && !n.read));
        assert_eq!(alice_notes[0].uri, "/events/1");

        assert_eq!(repo.list_for_user(bob.id).await.unwrap().len(), 1);
    }
}
