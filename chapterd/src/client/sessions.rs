use reqwest::Method;

use super::{Client, Result};
use crate::api::models::sessions::{SessionEnvelope, SessionResponse};
use crate::auth::credentials::Credentials;

/// `/sessions`: create, inspect and revoke session keys.
pub struct SessionsService<'a> {
    pub(super) client: &'a Client,
}

impl SessionsService<'_> {
    /// Exchange a username and password for a new session.
    ///
    /// Sent with the password only, whatever session the client holds.
    pub async fn create(&self, username: &str, password: &str) -> Result<SessionResponse> {
        let credentials = Credentials {
            identifier: username.to_string(),
            secret: password.to_string(),
        };
        let request = self.client.request_as(Method::POST, "sessions", Some(&credentials))?;
        let envelope: SessionEnvelope = self.client.send(request).await?;
        Ok(envelope.session)
    }

    /// The session the client is authenticated with, with its refreshed expiry.
    pub async fn get(&self) -> Result<SessionResponse> {
        let request = self.client.request(Method::GET, "sessions")?;
        let envelope: SessionEnvelope = self.client.send(request).await?;
        Ok(envelope.session)
    }

    /// Revoke the session the client is authenticated with.
    pub async fn delete(&self) -> Result<()> {
        let request = self.client.request(Method::DELETE, "sessions")?;
        self.client.send_empty(request).await
    }
}

#[cfg(test)]
mod tests {
    use crate::client::{Client, Error};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_ignores_held_session() {
        let (base, state) = spawn_test_app().await;
        let frank = create_test_user(&state.db, "frank", "pw").await;
        let mut client = Client::new(&base).unwrap();
        client.authenticate_password("root", TEST_ROOT_PASSWORD).await.unwrap();

        let session = client.sessions().create("frank", "pw").await.unwrap();
        assert_eq!(session.user_id, frank.id);

        // The client still acts as root
        let current = client.sessions().get().await.unwrap();
        assert_ne!(current.user_id, frank.id);
    }

    #[tokio::test]
    async fn test_get_without_session() {
        let (base, _state) = spawn_test_app().await;
        let client = Client::new(&base).unwrap();

        let err = client.sessions().get().await.unwrap_err();
        assert!(matches!(err, Error::Api { code: 401, .. }));
    }

    #[tokio::test]
    async fn test_delete_leaves_other_sessions() {
        let (base, _state) = spawn_test_app().await;
        let mut first = Client::new(&base).unwrap();
        let mut second = first.clone();
        first.authenticate_password("root", TEST_ROOT_PASSWORD).await.unwrap();
        second.authenticate_password("root", TEST_ROOT_PASSWORD).await.unwrap();

        first.sessions().delete().await.unwrap();

        assert!(first.sessions().get().await.is_err());
        second.sessions().get().await.unwrap();
    }
}
