//! HTTP Basic credential parsing.

use std::fmt;

use axum::http::{HeaderMap, header};
use base64::{Engine as _, engine::general_purpose};

use super::AuthError;
use super::authenticator::ClientError;

/// An `identifier:secret` pair taken from the `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// How to treat a decoded pair with an empty side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairPolicy {
    /// Empty identifier or secret is passed through for the strategy to reject by name.
    Lenient,
    /// Empty identifier or secret is a malformed pair.
    Strict,
}

/// Parse an `Authorization` header value of the form `Basic base64(identifier:secret)`.
///
/// The payload is split on its first colon, so secrets may contain colons and identifiers may
/// not.
pub fn parse_basic(value: &str, policy: PairPolicy) -> Result<Credentials, AuthError> {
    if value.is_empty() {
        return Err(AuthError::MissingHeader);
    }

    let parts: Vec<&str> = value.split(' ').collect();
    let [scheme, payload] = parts.as_slice() else {
        return Err(AuthError::MissingType);
    };

    if *scheme != "Basic" {
        return Err(AuthError::NotBasic);
    }

    let decoded = general_purpose::STANDARD.decode(payload).map_err(|_| AuthError::InvalidBase64)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::InvalidBase64)?;

    let (identifier, secret) = decoded.split_once(':').ok_or(AuthError::InvalidCredentialPair)?;
    if policy == PairPolicy::Strict && (identifier.is_empty() || secret.is_empty()) {
        return Err(AuthError::InvalidCredentialPair);
    }

    Ok(Credentials {
        identifier: identifier.to_string(),
        secret: secret.to_string(),
    })
}

/// Pull credentials out of request headers.
///
/// A header that is not valid visible ASCII cannot be inspected at all and is rejected without a
/// specific reason.
pub fn from_headers(headers: &HeaderMap, policy: PairPolicy) -> Result<Credentials, ClientError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err(AuthError::MissingHeader.into());
    };

    let value = value
        .to_str()
        .map_err(|_| ClientError::Unrecognized("authorization header is not valid ASCII".to_string()))?;

    Ok(parse_basic(value, policy)?)
}

/// Build a `Basic` header value. Used by clients and tests.
pub fn encode_basic(identifier: &str, secret: &str) -> String {
    format!("Basic {}", general_purpose::STANDARD.encode(format!("{identifier}:{secret}")))
}
