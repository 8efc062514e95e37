//!
//! # Client Error Handling
//!
//! This module defines `ClientError`, the single error type returned by every
//! session, store and API operation in the crate.
//!
//! Every failed API round trip is a `RequestError`, carrying the HTTP status (when a
//! response was received at all) and the server-supplied `{"error": "..."}` message
//! (when the body had one). Authentication failures are a distinguished case of the same
//! thing, wrapped in `AuthError` so callers can react to them separately (the auth store
//! forces a logout when a refresh is rejected).
//!
//! `From` implementations for `validator::ValidationErrors`, `serde_json::Error`,
//! `std::io::Error` and `reqwest::Error` allow the `?` operator throughout.

use thiserror::Error;
use validator::ValidationErrors;

/// A failed call to the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    /// HTTP status of the failed response. `None` when no response was received.
    pub status: Option<u16>,
    /// Message from the server's JSON error body, if it provided one.
    pub message: Option<String>,
}

impl RequestError {
    pub fn new(status: Option<u16>, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// A failure where the server was never reached.
    pub fn unreachable() -> Self {
        Self {
            status: None,
            message: None,
        }
    }

    /// True when the server refused the credentials used for the request.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, Some(401) | Some(403))
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.status, &self.message) {
            (Some(status), Some(msg)) => write!(f, "request failed with status {}: {}", status, msg),
            (Some(status), None) => write!(f, "request failed with status {}", status),
            (None, Some(msg)) => write!(f, "request failed: {}", msg),
            (None, None) => write!(f, "request failed: server unreachable"),
        }
    }
}

/// Authentication-specific failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// A token refresh was attempted without a persisted refresh token.
    #[error("no refresh token")]
    MissingRefreshToken,
    /// The remote service rejected the credentials or the refresh token.
    #[error("authentication rejected: {0}")]
    Rejected(RequestError),
}

/// Represents all possible errors returned by the client layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Any failed API call (HTTP error status or transport failure).
    #[error("{0}")]
    Request(RequestError),
    /// Authentication failure: rejected credentials or missing refresh token.
    #[error("{0}")]
    Auth(AuthError),
    /// Input failed client-side validation; nothing was sent.
    #[error("Validation Error: {0}")]
    Validation(String),
    /// A successful response body could not be decoded.
    #[error("Decode Error: {0}")]
    Decode(String),
    /// Session storage could not be read or written.
    #[error("Storage Error: {0}")]
    Storage(String),
    /// The environment configuration is invalid.
    #[error("Config Error: {0}")]
    Config(String),
}

impl ClientError {
    /// True for every failure that came from an API round trip, including auth rejections.
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            ClientError::Request(_) | ClientError::Auth(AuthError::Rejected(_))
        )
    }

    /// The message supplied by the server, when the failure carried one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Request(err) | ClientError::Auth(AuthError::Rejected(err)) => {
                err.message.as_deref()
            }
            _ => None,
        }
    }

    /// Message suitable for a store's `error` field.
    ///
    /// Prefers the server's message, then client-side validation text, then `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(msg) = self.server_message() {
            return msg.to_string();
        }
        match self {
            ClientError::Validation(msg) => msg.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<RequestError> for ClientError {
    fn from(error: RequestError) -> ClientError {
        ClientError::Request(error)
    }
}

impl From<AuthError> for ClientError {
    fn from(error: AuthError) -> ClientError {
        ClientError::Auth(error)
    }
}

/// The detailed validation messages are preserved.
impl From<ValidationErrors> for ClientError {
    fn from(error: ValidationErrors) -> ClientError {
        ClientError::Validation(error.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> ClientError {
        ClientError::Decode(error.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(error: std::io::Error) -> ClientError {
        ClientError::Storage(error.to_string())
    }
}

/// Transport failures keep the status when reqwest knows it; the body is not available here.
impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> ClientError {
        if error.is_decode() {
            return ClientError::Decode(error.to_string());
        }
        log::error!("HTTP transport error: {}", error);
        ClientError::Request(RequestError::new(
            error.status().map(|s| s.as_u16()),
            None,
        ))
    }
}
