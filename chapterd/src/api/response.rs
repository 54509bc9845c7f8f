//! JSON error envelope shared by every endpoint.
//!
//! Errors are rendered as `{"error":{"code":<status>,"message":<text>}}`. The handful of
//! conditions that occur on every route are serialized once and reused. HEAD requests never
//! carry a body, whatever the status.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
}

/// Serialize the error envelope for a status and message.
pub fn error_body(status: StatusCode, message: &str) -> String {
    serde_json::json!({
        "error": {
            "code": status.as_u16(),
            "message": message,
        }
    })
    .to_string()
}

/// Conditions with a fixed, pre-serialized body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownError {
    InternalServerError,
    NotAuthorized,
    NotFound,
    MethodNotAllowed,
}

static INTERNAL_SERVER_ERROR: Lazy<String> =
    Lazy::new(|| error_body(KnownError::InternalServerError.status(), KnownError::InternalServerError.message()));
static NOT_AUTHORIZED: Lazy<String> = Lazy::new(|| error_body(KnownError::NotAuthorized.status(), KnownError::NotAuthorized.message()));
static NOT_FOUND: Lazy<String> = Lazy::new(|| error_body(KnownError::NotFound.status(), KnownError::NotFound.message()));
static METHOD_NOT_ALLOWED: Lazy<String> =
    Lazy::new(|| error_body(KnownError::MethodNotAllowed.status(), KnownError::MethodNotAllowed.message()));

impl KnownError {
    pub fn status(self) -> StatusCode {
        match self {
            KnownError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            KnownError::NotAuthorized => StatusCode::UNAUTHORIZED,
            KnownError::NotFound => StatusCode::NOT_FOUND,
            KnownError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            KnownError::InternalServerError => "internal server error",
            KnownError::NotAuthorized => "not authorized",
            KnownError::NotFound => "not found",
            KnownError::MethodNotAllowed => "method not allowed",
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            KnownError::InternalServerError => INTERNAL_SERVER_ERROR.as_str(),
            KnownError::NotAuthorized => NOT_AUTHORIZED.as_str(),
            KnownError::NotFound => NOT_FOUND.as_str(),
            KnownError::MethodNotAllowed => METHOD_NOT_ALLOWED.as_str(),
        }
    }

    /// Render for a request made with `method`.
    pub fn respond(self, method: &Method) -> Response {
        json_response(method, self.status(), self.body().to_string())
    }
}

/// Build a JSON response, leaving the body out for HEAD requests.
pub fn json_response(method: &Method, status: StatusCode, body: String) -> Response {
    let content_type = (header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if method == Method::HEAD {
        (status, [content_type, (header::CONTENT_LENGTH, HeaderValue::from_static("0"))]).into_response()
    } else {
        (status, [content_type], body).into_response()
    }
}

/// Render an arbitrary error message in the envelope.
///
/// Used where the request method is not at hand; [`strip_head_body`] drops the body for HEAD.
pub fn json_error(status: StatusCode, message: &str) -> Response {
    json_response(&Method::GET, status, error_body(status, message))
}

/// Fallback for known paths hit with an unsupported method.
pub async fn method_not_allowed(method: Method) -> Response {
    KnownError::MethodNotAllowed.respond(&method)
}

/// Fallback for unknown paths.
pub async fn not_found(method: Method) -> Response {
    KnownError::NotFound.respond(&method)
}

/// Middleware that guarantees HEAD responses carry headers only, with `Content-Length: 0`.
pub async fn strip_head_body(request: Request, next: Next) -> Response {
    let is_head = request.method() == Method::HEAD;
    let response = next.run(request).await;
    if !is_head {
        return response;
    }

    let (mut parts, _) = response.into_parts();
    parts.headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
    Response::from_parts(parts, Body::empty())
}
