//! API request/response models for users.

use crate::db::models::users::UserDBResponse;
use crate::errors::Error;
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /users` and `PUT /users/{id}`.
///
/// Missing fields deserialize as empty and are then reported by [`UserInput::validate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct UserInput {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl UserInput {
    /// Parse a request body, mapping any syntax or type error to a single message.
    pub fn from_json(body: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(body).map_err(|e| {
            tracing::debug!("Rejected user body: {e}");
            Error::bad_request("invalid JSON request")
        })
    }

    /// Check required fields, then the email address.
    pub fn validate(&self) -> Result<(), Error> {
        let required = [
            ("password", &self.password),
            ("username", &self.username),
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
        ];

        if let Some((name, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(Error::bad_request(format!("empty field: {name}")));
        }

        if !is_valid_email(&self.email) {
            return Err(Error::bad_request("invalid field: email (could not parse valid email address)"));
        }

        Ok(())
    }
}

/// A single `local@domain` address without whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// A user as returned by the API. Never includes the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
            first_name: db.first_name,
            last_name: db.last_name,
            email: db.email,
            phone: db.phone,
        }
    }
}

/// Envelope for user responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
}

impl UsersResponse {
    pub fn one(user: impl Into<UserResponse>) -> Self {
        Self { users: vec![user.into()] }
    }
}
