//! Typed HTTP client for the `/api/v0` API.
//!
//! ```ignore
//! let mut client = Client::new("http://localhost:8080")?;
//! client.authenticate_password("root", "secret").await?;
//!
//! for user in client.users().list().await? {
//!     println!("{} {}", user.first_name, user.last_name);
//! }
//! ```
//!
//! After authenticating, every request carries `Authorization: Basic base64(username:key)` for
//! the stored session. Error responses are decoded from the JSON envelope into [`Error::Api`].

mod notifications;
mod sessions;
mod status;
mod users;

pub use notifications::NotificationsService;
pub use sessions::SessionsService;
pub use status::StatusService;
pub use users::UsersService;

use reqwest::{
    Method, RequestBuilder, Url,
    header::{ACCEPT, AUTHORIZATION, USER_AGENT},
};
use serde::de::DeserializeOwned;

use crate::api::models::sessions::SessionResponse;
use crate::api::response::ErrorEnvelope;
use crate::auth::credentials::{Credentials, encode_basic};

const API_VERSION: &str = "v0";
const CLIENT_USER_AGENT: &str = concat!("chapterd-client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server answered with an error envelope
    #[error("{code}: {message}")]
    Api { code: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A successful response without the expected item
    #[error("response contained no {0}")]
    Empty(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Client for one server. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base: Url,
    credentials: Option<Credentials>,
}

impl Client {
    /// Client for the server at `base_url`, e.g. `http://localhost:8080` or `https://example.org/chapter/`.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    /// Like [`Client::new`], reusing an existing `reqwest` client.
    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Result<Self> {
        Ok(Self {
            http,
            base: with_trailing_slash(Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{base_url}: {e}")))?),
            credentials: None,
        })
    }

    pub fn sessions(&self) -> SessionsService<'_> {
        SessionsService { client: self }
    }

    pub fn users(&self) -> UsersService<'_> {
        UsersService { client: self }
    }

    pub fn notifications(&self) -> NotificationsService<'_> {
        NotificationsService { client: self }
    }

    pub fn status(&self) -> StatusService<'_> {
        StatusService { client: self }
    }

    /// Create a session with a password and use it for later requests.
    pub async fn authenticate_password(&mut self, username: &str, password: &str) -> Result<SessionResponse> {
        let session = self.sessions().create(username, password).await?;
        self.credentials = Some(Credentials {
            identifier: username.to_string(),
            secret: session.key.clone(),
        });
        Ok(session)
    }

    /// Adopt an existing session key after checking it with the server.
    ///
    /// The key is only kept when the server accepts it.
    pub async fn authenticate_session(&mut self, username: &str, key: &str) -> Result<SessionResponse> {
        self.credentials = Some(Credentials {
            identifier: username.to_string(),
            secret: key.to_string(),
        });

        match self.sessions().get().await {
            Ok(session) => Ok(session),
            Err(e) => {
                self.credentials = None;
                Err(e)
            }
        }
    }

    /// Delete the current session on the server and forget it.
    pub async fn sign_out(&mut self) -> Result<()> {
        self.sessions().delete().await?;
        self.credentials = None;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// Request for `endpoint` under the API root, authenticated with the stored session if any.
    fn request(&self, method: Method, endpoint: &str) -> Result<RequestBuilder> {
        self.request_as(method, endpoint, self.credentials.as_ref())
    }

    fn request_as(&self, method: Method, endpoint: &str, credentials: Option<&Credentials>) -> Result<RequestBuilder> {
        let path = format!("api/{API_VERSION}/{endpoint}");
        let url = self.base.join(&path).map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))?;

        let mut builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT);

        if let Some(credentials) = credentials {
            builder = builder.header(AUTHORIZATION, encode_basic(&credentials.identifier, &credentials.secret));
        }

        Ok(builder)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = check_response(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        check_response(request.send().await?).await?;
        Ok(())
    }
}

/// `Url::join` replaces the last path segment unless the base ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Turn a non-2xx response into [`Error::Api`].
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await?;
    let err = match serde_json::from_slice::<ErrorEnvelope>(&body) {
        Ok(envelope) => Error::Api {
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) => Error::Api {
            code: status.as_u16(),
            message: status.canonical_reason().unwrap_or("unknown error").to_string(),
        },
    };

    tracing::debug!("API request failed: {err}");
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn api_error(err: Error) -> (u16, String) {
        match err {
            Error::Api { code, message } => (code, message),
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(Client::new("not a url"), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_endpoint_urls() {
        let client = Client::new("http://localhost:8080").unwrap();
        let request = client.request(Method::GET, "users/7").unwrap().build().unwrap();

        assert_eq!(request.url().as_str(), "http://localhost:8080/api/v0/users/7");
        assert!(request.headers().get(AUTHORIZATION).is_none());
        assert_eq!(request.headers()[ACCEPT], "application/json");
    }

    #[test]
    fn test_base_path_is_kept() {
        for base in ["http://example.org/chapter", "http://example.org/chapter/"] {
            let client = Client::new(base).unwrap();
            let request = client.request(Method::GET, "status").unwrap().build().unwrap();
            assert_eq!(request.url().as_str(), "http://example.org/chapter/api/v0/status");
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_password_authentication_stores_session() {
        let (base, _state) = spawn_test_app().await;
        let mut client = Client::new(&base).unwrap();
        assert!(!client.is_authenticated());

        let session = client.authenticate_password("root", TEST_ROOT_PASSWORD).await.unwrap();
        assert!(client.is_authenticated());

        let current = client.sessions().get().await.unwrap();
        assert_eq!(current.id, session.id);
        assert_eq!(current.key, session.key);

        let request = client.request(Method::GET, "users").unwrap().build().unwrap();
        assert_eq!(request.headers()[AUTHORIZATION], encode_basic("root", &session.key).as_str());
    }

    #[tokio::test]
    async fn test_wrong_password_is_api_error() {
        let (base, _state) = spawn_test_app().await;
        let mut client = Client::new(&base).unwrap();

        let err = client.authenticate_password("root", "wrong").await.unwrap_err();
        assert_eq!(api_error(err), (401, "invalid password".to_string()));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_authenticate_session_checks_key() {
        let (base, state) = spawn_test_app().await;
        let mut client = Client::new(&base).unwrap();

        let err = client.authenticate_session("root", "made-up").await.unwrap_err();
        assert_eq!(api_error(err), (401, "invalid API key".to_string()));
        assert!(!client.is_authenticated());

        let erin = create_test_user(&state.db, "erin", "pw").await;
        let session = create_test_session(&state.db, erin.id).await;

        let adopted = client.authenticate_session("erin", &session.key).await.unwrap();
        assert_eq!(adopted.id, session.id);
        assert_eq!(adopted.user_id, erin.id);
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_out_revokes_key() {
        let (base, _state) = spawn_test_app().await;
        let mut client = Client::new(&base).unwrap();
        let session = client.authenticate_password("root", TEST_ROOT_PASSWORD).await.unwrap();

        client.sign_out().await.unwrap();
        assert!(!client.is_authenticated());

        let err = client.users().list().await.unwrap_err();
        assert_eq!(api_error(err), (401, "no HTTP Authorization header".to_string()));

        let err = client.authenticate_session("root", &session.key).await.unwrap_err();
        assert_eq!(api_error(err), (401, "invalid API key".to_string()));
    }
}
