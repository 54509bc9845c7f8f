//! Route protection middleware.
//!
//! Runs one [`Authenticator`] in front of a group of routes. On success the [`Principal`] is
//! stored in the request's extensions for the [`current_user`](super::current_user) extractors.
//! Failures are rendered here and the wrapped handler never runs.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{debug, error};

use super::authenticator::{AuthFailure, Authenticator, ClientError, Principal};
use crate::AppState;
use crate::api::response::{self, KnownError};

/// State for [`require_auth`]: the application plus the strategy guarding the routes.
#[derive(Clone)]
pub struct AuthGuard {
    state: AppState,
    authenticator: Authenticator,
}

impl AuthGuard {
    pub fn new(state: AppState, authenticator: Authenticator) -> Self {
        Self { state, authenticator }
    }
}

/// Authenticate the request or answer it with 401/500.
pub async fn require_auth(State(guard): State<AuthGuard>, mut request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let session_duration = guard.state.config.auth.session_duration;

    let outcome = guard
        .authenticator
        .authenticate(&guard.state.db, request.headers(), session_duration, Utc::now())
        .await;

    match outcome {
        Ok(principal) => {
            request.extensions_mut().insert::<Principal>(principal);
            next.run(request).await
        }
        Err(AuthFailure::Server(err)) => {
            error!(
                strategy = guard.authenticator.name(),
                method = %method,
                path = %request.uri().path(),
                "Authentication failed with server error: {err:#}"
            );
            KnownError::InternalServerError.respond(&method)
        }
        Err(AuthFailure::Client(ClientError::Auth(reason))) => {
            debug!(strategy = guard.authenticator.name(), path = %request.uri().path(), "Rejected credentials: {reason}");
            let body = response::error_body(StatusCode::UNAUTHORIZED, &reason.to_string());
            response::json_response(&method, StatusCode::UNAUTHORIZED, body)
        }
        Err(AuthFailure::Client(ClientError::Unrecognized(detail))) => {
            debug!(strategy = guard.authenticator.name(), path = %request.uri().path(), "Rejected request: {detail}");
            KnownError::NotAuthorized.respond(&method)
        }
    }
}
