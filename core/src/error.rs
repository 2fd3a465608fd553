//! Error types for the API client.
//!
//! # Design
//! `AuthExpired` gets a dedicated variant because callers must react to it
//! by sending the user back to the login flow. Every other non-2xx response
//! lands in `Http`, whose message is the raw body the server sent so the
//! caller can show it as-is. Transport failures pass through untouched.

use thiserror::Error;

use crate::http::HttpMethod;

/// Message shown when the session cannot be renewed.
pub const AUTH_EXPIRED_MESSAGE: &str = "Session expired. Please log in again";

/// Errors returned by `ApiClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server kept answering 401 and a refresh did not help.
    #[error("{}", AUTH_EXPIRED_MESSAGE)]
    AuthExpired,

    /// The server returned a non-2xx status other than 401.
    #[error("{body}")]
    Http { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the requested type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("{method} requests cannot carry a body")]
    BodyNotAllowed { method: HttpMethod },
}

/// The network round-trip itself failed (DNS, connect, TLS, I/O).
#[derive(Debug, Error)]
#[error("transport failure: {source}")]
pub struct TransportError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}
