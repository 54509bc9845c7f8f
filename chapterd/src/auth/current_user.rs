//! Extractors for the authenticated principal.
//!
//! Both read what [`require_auth`](super::middleware::require_auth) stored in the request
//! extensions. Using one on a route without the middleware yields 401.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::authenticator::Principal;
use crate::db::models::{sessions::SessionDBResponse, users::UserDBResponse};
use crate::errors::Error;

/// The user the request is acting as.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserDBResponse);

/// The session the request authenticated with. Only present on key-authenticated routes.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionDBResponse);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .map(|principal| CurrentUser(principal.user.clone()))
            .ok_or(Error::Unauthenticated)
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .and_then(|principal| principal.session.clone())
            .map(CurrentSession)
            .ok_or(Error::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::Utc;

    fn principal(with_session: bool) -> Principal {
        let now = Utc::now();
        Principal {
            user: UserDBResponse {
                id: 7,
                username: "alice".to_string(),
                first_name: "Alice".to_string(),
                last_name: "Liddell".to_string(),
                email: "alice@example.com".to_string(),
                phone: String::new(),
                password_hash: "hash".to_string(),
                created_at: now,
                updated_at: now,
            },
            session: with_session.then(|| SessionDBResponse {
                id: 3,
                user_id: 7,
                key: "k".to_string(),
                expires_at: now,
                created_at: now,
            }),
        }
    }

    fn parts_with(principal: Option<Principal>) -> Parts {
        let mut request = Request::new(());
        if let Some(principal) = principal {
            request.extensions_mut().insert(principal);
        }
        request.into_parts().0
    }

    #[tokio::test]
    async fn test_current_user_reads_extension() {
        let mut parts = parts_with(Some(principal(false)));
        let CurrentUser(user) = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.id, 7);

        // No session was attached by password authentication
        assert!(CurrentSession::from_request_parts(&mut parts, &()).await.is_err());
    }

    #[tokio::test]
    async fn test_current_session_reads_extension() {
        let mut parts = parts_with(Some(principal(true)));
        let CurrentSession(session) = CurrentSession::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(session.id, 3);
    }

    #[tokio::test]
    async fn test_missing_principal_is_unauthenticated() {
        let mut parts = parts_with(None);
        let err = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, Error::Unauthenticated));
        assert_eq!(err.user_message(), "not authorized");
    }
}
