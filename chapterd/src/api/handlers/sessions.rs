use crate::{
    AppState,
    api::models::sessions::SessionEnvelope,
    auth::{
        current_user::{CurrentSession, CurrentUser},
        utils::generate_api_key,
    },
    db::{
        handlers::{Repository, Sessions},
        models::sessions::{SessionCreateDBRequest, expiry_after},
    },
    errors::{Error, Result},
};
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;

/// Exchange a username and password for a session API key.
///
/// This is the only response that reveals a freshly generated key.
#[utoipa::path(
    post,
    path = "/sessions",
    tag = "sessions",
    summary = "Create session",
    description = "Authenticate with `username:password` and receive an API key valid for the configured session duration",
    responses(
        (status = 200, description = "Session created", body = SessionEnvelope),
        (status = 401, description = "Missing, malformed or wrong credentials"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("BasicAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(user_id = user.id))]
pub async fn create_session(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<SessionEnvelope>> {
    let expires_at = expiry_after(Utc::now(), state.config.auth.session_duration).ok_or_else(|| Error::Internal {
        operation: "compute session expiry".to_string(),
    })?;

    let request = SessionCreateDBRequest {
        user_id: user.id,
        key: generate_api_key(),
        expires_at,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let session = Sessions::new(&mut conn).create(&request).await?;

    tracing::info!(session_id = session.id, "Issued session for '{}'", user.username);
    Ok(Json(SessionEnvelope::from(session)))
}

/// Return the session the request authenticated with.
#[utoipa::path(
    get,
    path = "/sessions",
    tag = "sessions",
    summary = "Get current session",
    responses(
        (status = 200, description = "The current session, with its refreshed expiry", body = SessionEnvelope),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("BasicAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(session_id = session.id))]
pub async fn get_session(CurrentSession(session): CurrentSession) -> Json<SessionEnvelope> {
    Json(SessionEnvelope::from(session))
}

/// Revoke the session the request authenticated with.
#[utoipa::path(
    delete,
    path = "/sessions",
    tag = "sessions",
    summary = "Delete current session",
    responses(
        (status = 204, description = "Session deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(
        ("BasicAuth" = [])
    )
)]
#[tracing::instrument(skip_all, fields(session_id = session.id))]
pub async fn delete_session(State(state): State<AppState>, CurrentSession(session): CurrentSession) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    Sessions::new(&mut conn).delete(session.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::api::models::sessions::SessionEnvelope;
    use crate::auth::credentials::encode_basic;
    use crate::db::handlers::{Sessions, Users};
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use chrono::Utc;
    use serde_json::Value;

    #[test_log::test(tokio::test)]
    async fn test_create_session_expires_after_configured_duration() {
        let (server, state) = create_test_server().await;
        let before = Utc::now().timestamp();

        let response = server
            .post("/api/v0/sessions")
            .add_header("authorization", encode_basic("root", TEST_ROOT_PASSWORD))
            .await;
        response.assert_status_ok();
        let envelope: SessionEnvelope = response.json();

        let duration = state.config.auth.session_duration.as_secs() as i64;
        assert!(envelope.session.expires >= before + duration);
        assert!(envelope.session.expires <= Utc::now().timestamp() + duration);
        assert!(!envelope.session.key.is_empty());

        let mut conn = state.db.acquire().await.unwrap();
        let root = Users::new(&mut conn).get_user_by_username("root").await.unwrap().unwrap();
        assert_eq!(envelope.session.user_id, root.id);

        let stored = Sessions::new(&mut conn).get_by_key(&envelope.session.key).await.unwrap().unwrap();
        assert_eq!(stored.id, envelope.session.id);
        assert_eq!(stored.user_id, root.id);
    }

    #[tokio::test]
    async fn test_create_session_for_other_user_belongs_to_them() {
        let (server, state) = create_test_server().await;
        let alice = create_test_user(&state.db, "alice", "wonderland").await;

        let response = server
            .post("/api/v0/sessions")
            .add_header("authorization", encode_basic("alice", "wonderland"))
            .await;
        response.assert_status_ok();
        let envelope: SessionEnvelope = response.json();
        assert_eq!(envelope.session.user_id, alice.id);

        let mut conn = state.db.acquire().await.unwrap();
        let stored = Sessions::new(&mut conn).get_by_key(&envelope.session.key).await.unwrap().unwrap();
        assert_eq!(stored.user_id, alice.id);
    }

    #[tokio::test]
    async fn test_unrepresentable_expiry_is_internal_error() {
        let mut config = create_test_config();
        config.auth.session_duration = std::time::Duration::from_secs(1_000_000 * 365 * 24 * 60 * 60);
        let (server, state) = create_test_server_with_config(config).await;

        let response = server
            .post("/api/v0/sessions")
            .add_header("authorization", encode_basic("root", TEST_ROOT_PASSWORD))
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["error"]["message"], "internal server error");

        let sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(sessions, 0);

        // Key authentication with the same setting fails cleanly too
        let root = {
            let mut conn = state.db.acquire().await.unwrap();
            Users::new(&mut conn).get_user_by_username("root").await.unwrap().unwrap()
        };
        let session = create_test_session(&state.db, root.id).await;
        server
            .get("/api/v0/sessions")
            .add_header("authorization", encode_basic("root", &session.key))
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_create_session_requires_complete_pair() {
        let (server, _state) = create_test_server().await;

        for header in [encode_basic("root", ""), encode_basic("", TEST_ROOT_PASSWORD)] {
            let response = server.post("/api/v0/sessions").add_header("authorization", header).await;
            response.assert_status(StatusCode::UNAUTHORIZED);
            let body: Value = response.json();
            assert_eq!(
                body["error"]["message"],
                "invalid credential pair in HTTP Basic Authorization header"
            );
        }
    }

    #[tokio::test]
    async fn test_get_session_returns_refreshed_session() {
        let (server, state) = create_test_server().await;
        let carol = create_test_user(&state.db, "carol", "pw").await;
        let session = create_test_session(&state.db, carol.id).await;

        let response = server
            .get("/api/v0/sessions")
            .add_header("authorization", encode_basic("carol", &session.key))
            .await;
        response.assert_status_ok();
        let envelope: SessionEnvelope = response.json();
        assert_eq!(envelope.session.id, session.id);
        assert_eq!(envelope.session.key, session.key);

        // Created with a one-day expiry, pushed out to the configured duration on use
        assert!(envelope.session.expires > session.expires_at.timestamp());
    }

    #[tokio::test]
    async fn test_get_session_rejects_password() {
        let (server, _state) = create_test_server().await;

        let response = server
            .get("/api/v0/sessions")
            .add_header("authorization", encode_basic("root", TEST_ROOT_PASSWORD))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_delete_session_only_revokes_current_key() {
        let (server, state) = create_test_server().await;
        let user = create_test_user(&state.db, "dave", "pw").await;
        let first = create_test_session(&state.db, user.id).await;
        let second = create_test_session(&state.db, user.id).await;

        server
            .delete("/api/v0/sessions")
            .add_header("authorization", encode_basic("dave", &first.key))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get("/api/v0/sessions")
            .add_header("authorization", encode_basic("dave", &first.key))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/api/v0/sessions")
            .add_header("authorization", encode_basic("dave", &second.key))
            .await
            .assert_status_ok();
    }
}
