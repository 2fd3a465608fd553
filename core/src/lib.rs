//! Client-side helpers for the backend API.
//!
//! # Overview
//! - `ApiClient` sends JSON requests with the session cookies attached. When
//!   the server answers 401 it refreshes the session once and replays the
//!   request once.
//! - `validation` holds the pure field validators used by the forms.
//!
//! # Design
//! - `ApiClient` is stateless apart from its `ClientConfig` and `Transport`.
//! - Requests and responses are plain data (`HttpRequest` / `HttpResponse`),
//!   so the retry flow is tested against scripted responses and the real
//!   network sits behind `CookieTransport`.
//! - Session cookies belong to the transport. Client code only sees whether
//!   a refresh succeeded.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod validation;

pub use auth::{AuthDecision, AuthPhase};
pub use client::{parse_response, ApiClient};
pub use config::ClientConfig;
pub use error::{ApiError, TransportError, AUTH_EXPIRED_MESSAGE};
pub use http::{Credentials, HttpMethod, HttpRequest, HttpResponse};
pub use transport::{CookieTransport, ScriptedTransport, Transport};
pub use validation::{Field, ValidationResult};
