//! Database repository for sessions.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::sessions::{SessionCreateDBRequest, SessionDBResponse, SessionUpdateDBRequest},
};
use crate::types::{SessionId, UserId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

/// Filter for listing sessions
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub user_id: Option<UserId>,
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub api_key: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Session> for SessionDBResponse {
    fn from(session: Session) -> Self {
        Self {
            id: session.id,
            user_id: session.user_id,
            key: session.api_key,
            expires_at: session.expires_at,
            created_at: session.created_at,
        }
    }
}

pub struct Sessions<'c> {
    db: &'c mut SqliteConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Sessions<'c> {
    type CreateRequest = SessionCreateDBRequest;
    type UpdateRequest = SessionUpdateDBRequest;
    type Response = SessionDBResponse;
    type Id = SessionId;
    type Filter = SessionFilter;

    #[instrument(skip(self, request), fields(user_id = request.user_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, api_key, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(&request.key)
        .bind(request.expires_at)
        .bind(Utc::now())
        .fetch_one(&mut *self.db)
        .await?;

        Ok(SessionDBResponse::from(session))
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(session.map(SessionDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(user_id = ?filter.user_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let sessions = match filter.user_id {
            Some(user_id) => {
                sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE user_id = ? ORDER BY id")
                    .bind(user_id)
                    .fetch_all(&mut *self.db)
                    .await?
            }
            None => {
                sqlx::query_as::<_, Session>("SELECT * FROM sessions ORDER BY id")
                    .fetch_all(&mut *self.db)
                    .await?
            }
        };

        Ok(sessions.into_iter().map(SessionDBResponse::from).collect())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(expires_at = %request.expires_at), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let session = sqlx::query_as::<_, Session>("UPDATE sessions SET expires_at = ? WHERE id = ? RETURNING *")
            .bind(request.expires_at)
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(SessionDBResponse::from(session))
    }
}

impl<'c> Sessions<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Look a session up by its API key.
    #[instrument(skip_all, err)]
    pub async fn get_by_key(&mut self, key: &str) -> Result<Option<SessionDBResponse>> {
        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE api_key = ?")
            .bind(key)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(session.map(SessionDBResponse::from))
    }
}
