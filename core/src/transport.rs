//! Executing `HttpRequest` values against the network.
//!
//! # Design
//! `ApiClient` only ever talks to a `Transport`. The transport owns the
//! credential store: `CookieTransport` keeps session cookies in its
//! `ureq::Agent` jar, attaching them to requests and absorbing `Set-Cookie`
//! headers from responses, so token material never reaches client code.
//! `ScriptedTransport` replays canned responses for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use ureq::typestate::WithBody;
use ureq::{Agent, RequestBuilder};

use crate::error::TransportError;
use crate::http::{Credentials, HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round-trip.
///
/// Non-2xx statuses are responses, not errors: only a failed round-trip
/// returns `Err`.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// ureq-backed transport with a persistent cookie jar.
///
/// Clones share the jar, so every clone sees the same session.
#[derive(Debug, Clone)]
pub struct CookieTransport {
    agent: Agent,
}

impl CookieTransport {
    pub fn new() -> Self {
        Self { agent: new_agent() }
    }
}

impl Default for CookieTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for CookieTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        // A throwaway agent has an empty jar and its jar is dropped afterwards.
        let agent = match request.credentials {
            Credentials::Include => self.agent.clone(),
            Credentials::Omit => new_agent(),
        };

        let mut response = dispatch(&agent, request).map_err(TransportError::new)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(TransportError::new)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Status codes are returned as data so the client can interpret them.
fn new_agent() -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

fn dispatch(
    agent: &Agent,
    request: &HttpRequest,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    let url = request.url.as_str();
    match (request.method, request.body.as_deref()) {
        (HttpMethod::Get, _) => with_headers(agent.get(url), &request.headers).call(),
        (HttpMethod::Delete, None) => with_headers(agent.delete(url), &request.headers).call(),
        (HttpMethod::Delete, Some(body)) => {
            send(agent.delete(url).force_send_body(), &request.headers, Some(body))
        }
        (HttpMethod::Post, body) => send(agent.post(url), &request.headers, body),
        (HttpMethod::Put, body) => send(agent.put(url), &request.headers, body),
        (HttpMethod::Patch, body) => send(agent.patch(url), &request.headers, body),
    }
}

fn send(
    builder: RequestBuilder<WithBody>,
    headers: &[(String, String)],
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    let builder = with_headers(builder, headers);
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Replays a fixed sequence of outcomes and records every request it sees.
///
/// Running past the end of the script yields a transport error, which makes
/// an unexpected extra round-trip show up as a test failure.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse, String>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = HttpResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().map(Ok).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Queue a transport failure after the responses scripted so far.
    pub fn then_fail(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(Err(message.to_string()));
        self
    }

    /// Requests executed so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());
        match self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
        {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::new(message)),
            None => Err(TransportError::new("script exhausted")),
        }
    }
}
