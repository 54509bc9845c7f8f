//! Authentication strategies.
//!
//! A strategy turns the request's credential pair into a [`Principal`] or explains why it could
//! not. Client failures carry an [`AuthError`] whose text is returned to the caller; server
//! failures carry the underlying cause, which is logged and never shown.
//!
//! Empty identifiers and secrets are rejected before the store is touched.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{instrument, warn};

use super::AuthError;
use super::credentials::{self, Credentials, PairPolicy};
use super::password;
use crate::db::errors::DbError;
use crate::db::handlers::{Repository, Sessions, Users};
use crate::db::models::sessions::{SessionDBResponse, SessionUpdateDBRequest, expiry_after};
use crate::db::models::users::UserDBResponse;
use crate::types::SessionId;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: UserDBResponse,
    /// Present when the request authenticated with a session API key.
    pub session: Option<SessionDBResponse>,
}

/// A rejection caused by the request itself.
#[derive(Debug)]
pub enum ClientError {
    /// One of the known rejection reasons.
    Auth(AuthError),
    /// Something we have no specific reason for, e.g. an unreadable header.
    Unrecognized(String),
}

impl From<AuthError> for ClientError {
    fn from(err: AuthError) -> Self {
        ClientError::Auth(err)
    }
}

/// Why authentication did not produce a principal.
#[derive(Debug)]
pub enum AuthFailure {
    Client(ClientError),
    Server(anyhow::Error),
}

impl From<AuthError> for AuthFailure {
    fn from(err: AuthError) -> Self {
        AuthFailure::Client(ClientError::Auth(err))
    }
}

impl From<ClientError> for AuthFailure {
    fn from(err: ClientError) -> Self {
        AuthFailure::Client(err)
    }
}

impl From<DbError> for AuthFailure {
    fn from(err: DbError) -> Self {
        AuthFailure::Server(anyhow::Error::from(err))
    }
}

pub type Outcome = Result<Principal, AuthFailure>;

/// The lookups and writes the strategies need.
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn user_by_username(&self, username: &str) -> Result<Option<UserDBResponse>, DbError>;

    async fn session_by_key(&self, key: &str) -> Result<Option<SessionDBResponse>, DbError>;

    /// Persist a new expiry for a session.
    async fn update_session(&self, id: SessionId, expires_at: DateTime<Utc>) -> Result<(), DbError>;

    async fn delete_session(&self, id: SessionId) -> Result<(), DbError>;
}

#[async_trait]
impl AuthStore for SqlitePool {
    async fn user_by_username(&self, username: &str) -> Result<Option<UserDBResponse>, DbError> {
        let mut conn = self.acquire().await?;
        Users::new(&mut conn).get_user_by_username(username).await
    }

    async fn session_by_key(&self, key: &str) -> Result<Option<SessionDBResponse>, DbError> {
        let mut conn = self.acquire().await?;
        Sessions::new(&mut conn).get_by_key(key).await
    }

    async fn update_session(&self, id: SessionId, expires_at: DateTime<Utc>) -> Result<(), DbError> {
        let mut conn = self.acquire().await?;
        Sessions::new(&mut conn)
            .update(id, &SessionUpdateDBRequest { expires_at })
            .await
            .map(|_| ())
    }

    async fn delete_session(&self, id: SessionId) -> Result<(), DbError> {
        let mut conn = self.acquire().await?;
        Sessions::new(&mut conn).delete(id).await.map(|_| ())
    }
}

/// Which credential scheme a route expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authenticator {
    /// `username:password`
    Password,
    /// `username:api_key`, sliding the session expiry on success
    Key,
    /// Legacy `username:password` with a strictly shaped pair, used to issue sessions
    Basic,
}

impl Authenticator {
    pub fn name(self) -> &'static str {
        match self {
            Authenticator::Password => "password",
            Authenticator::Key => "key",
            Authenticator::Basic => "basic",
        }
    }

    fn pair_policy(self) -> PairPolicy {
        match self {
            Authenticator::Password | Authenticator::Key => PairPolicy::Lenient,
            Authenticator::Basic => PairPolicy::Strict,
        }
    }

    /// Authenticate a request from its headers.
    ///
    /// `session_duration` is how far past `now` a key-authenticated session is extended.
    #[instrument(skip_all, fields(strategy = self.name()))]
    pub async fn authenticate<S>(self, store: &S, headers: &HeaderMap, session_duration: Duration, now: DateTime<Utc>) -> Outcome
    where
        S: AuthStore + ?Sized,
    {
        let credentials = credentials::from_headers(headers, self.pair_policy())?;

        match self {
            Authenticator::Password | Authenticator::Basic => authenticate_password(store, credentials).await,
            Authenticator::Key => authenticate_key(store, credentials, session_duration, now).await,
        }
    }
}

async fn authenticate_password<S>(store: &S, credentials: Credentials) -> Outcome
where
    S: AuthStore + ?Sized,
{
    let Credentials {
        identifier: username,
        secret: candidate,
    } = credentials;

    if username.is_empty() {
        return Err(AuthError::NoUsername.into());
    }
    if candidate.is_empty() {
        return Err(AuthError::NoPassword.into());
    }

    let user = store.user_by_username(&username).await?.ok_or(AuthError::InvalidUsername)?;

    let hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || password::verify_string(&candidate, &hash))
        .await
        .map_err(|e| AuthFailure::Server(anyhow::anyhow!("password verification task failed: {e}")))?
        .map_err(|e| AuthFailure::Server(anyhow::anyhow!("password verification failed for user {}: {e}", user.id)))?;

    if !matches {
        return Err(AuthError::InvalidPassword.into());
    }

    Ok(Principal { user, session: None })
}

async fn authenticate_key<S>(store: &S, credentials: Credentials, session_duration: Duration, now: DateTime<Utc>) -> Outcome
where
    S: AuthStore + ?Sized,
{
    let Credentials {
        identifier: username,
        secret: key,
    } = credentials;

    if username.is_empty() {
        return Err(AuthError::NoUsername.into());
    }
    if key.is_empty() {
        return Err(AuthError::NoApiKey.into());
    }

    let user = store.user_by_username(&username).await?.ok_or(AuthError::InvalidUsername)?;
    let mut session = store.session_by_key(&key).await?.ok_or(AuthError::InvalidApiKey)?;

    // Someone else's key is reported exactly like an unknown one
    if session.user_id != user.id {
        return Err(AuthError::InvalidApiKey.into());
    }

    if session.is_expired(now) {
        store.delete_session(session.id).await?;
        return Err(AuthError::ExpiredApiKey.into());
    }

    let expires_at = expiry_after(now, session_duration).ok_or_else(|| {
        AuthFailure::Server(anyhow::anyhow!(
            "session duration of {} overflows the expiry timestamp",
            humantime::format_duration(session_duration)
        ))
    })?;

    match store.update_session(session.id, expires_at).await {
        Ok(()) => session.expires_at = expires_at,
        Err(e) if e.is_read_only() => {
            warn!(session_id = session.id, "Store is read-only, session expiry not extended: {e}");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Principal {
        user,
        session: Some(session),
    })
}
