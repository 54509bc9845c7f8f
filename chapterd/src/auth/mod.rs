//! Authentication for the HTTP API.
//!
//! Every protected route carries HTTP Basic credentials. What the pair means depends on the
//! strategy the route is wired to:
//!
//! - **Password**: `username:password`, checked against the stored Argon2 hash
//! - **Key**: `username:api_key`, where the key belongs to a live session owned by that user.
//!   Each successful request slides the session expiry forward.
//! - **Basic**: legacy `username:password` used to issue sessions. Stricter about the shape of
//!   the credential pair than the other two.
//!
//! # Modules
//!
//! - [`credentials`]: Parsing of the `Authorization` header
//! - [`authenticator`]: The strategies and the store they read from
//! - [`middleware`]: Route protection middleware
//! - [`current_user`]: Extractors for the authenticated principal in handlers
//! - [`password`]: Password hashing and verification using Argon2
//! - [`utils`]: Random credential generation
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use chapterd::auth::current_user::CurrentUser;
//!
//! async fn protected_handler(CurrentUser(user): CurrentUser) -> String {
//!     format!("Hello, {}!", user.username)
//! }
//! ```

pub mod authenticator;
pub mod credentials;
pub mod current_user;
pub mod middleware;
pub mod password;
pub mod utils;

use thiserror::Error;

/// Reasons a request's credentials are rejected.
///
/// The display strings are sent to clients verbatim.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("no HTTP Authorization header")]
    MissingHeader,
    #[error("no HTTP Authorization type")]
    MissingType,
    #[error("not HTTP Basic Authorization type")]
    NotBasic,
    #[error("invalid base64 HTTP Basic Authorization header")]
    InvalidBase64,
    #[error("invalid credential pair in HTTP Basic Authorization header")]
    InvalidCredentialPair,
    #[error("no username provided")]
    NoUsername,
    #[error("no password provided")]
    NoPassword,
    #[error("no API key provided")]
    NoApiKey,
    #[error("invalid username")]
    InvalidUsername,
    #[error("invalid password")]
    InvalidPassword,
    #[error("invalid API key")]
    InvalidApiKey,
    #[error("expired API key")]
    ExpiredApiKey,
}
