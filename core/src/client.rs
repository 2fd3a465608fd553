//! Authenticated request wrapper for the backend API.
//!
//! # Design
//! `ApiClient` holds its configuration and a `Transport` and carries no
//! mutable state between calls. Each call is split the same way: a `build_*`
//! method produces an `HttpRequest`, the transport executes it, and
//! `parse_response` turns the `HttpResponse` into a JSON value or an error.
//!
//! A 401 is handled by `AuthPhase`: the client asks the refresh endpoint for
//! new session cookies once and replays the identical request once. Session
//! cookies live in the transport; the client only learns whether the
//! refresh succeeded.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::auth::{AuthDecision, AuthPhase};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{Credentials, HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

const UNAUTHORIZED: u16 = 401;

/// Client for the backend API, generic over how requests reach the network.
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    config: ClientConfig,
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Describe a request to `endpoint` with an optional JSON payload.
    pub fn build_request(
        &self,
        endpoint: &str,
        method: HttpMethod,
        payload: Option<&Value>,
    ) -> Result<HttpRequest, ApiError> {
        let body = match payload {
            Some(_) if method == HttpMethod::Get => {
                return Err(ApiError::BodyNotAllowed { method });
            }
            Some(payload) => Some(
                serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?,
            ),
            None => None,
        };
        Ok(HttpRequest {
            method,
            url: self.config.url_for(endpoint),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
            credentials: Credentials::Include,
        })
    }

    pub fn build_refresh(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: self.config.refresh_url(),
            headers: Vec::new(),
            body: None,
            credentials: Credentials::Include,
        }
    }

    /// Send a request and return the parsed JSON body.
    ///
    /// `Ok(None)` means the server succeeded without a JSON body (for
    /// example a 204).
    #[instrument(skip(self, payload))]
    pub fn perform(
        &self,
        endpoint: &str,
        method: HttpMethod,
        payload: Option<&Value>,
    ) -> Result<Option<Value>, ApiError> {
        let request = self.build_request(endpoint, method, payload)?;
        let mut phase = AuthPhase::Initial;
        loop {
            let response = self.transport.execute(&request)?;
            if response.status != UNAUTHORIZED {
                return parse_response(response);
            }
            let (next, decision) = phase.on_unauthorized(|| self.refresh());
            phase = next;
            match decision {
                AuthDecision::Retry => debug!("session refreshed, retrying request"),
                AuthDecision::Expired => return Err(ApiError::AuthExpired),
            }
        }
    }

    /// Ask the server for fresh session cookies.
    ///
    /// Never fails: transport errors and non-2xx statuses are logged and
    /// reported as `false`.
    #[instrument(skip(self))]
    pub fn refresh(&self) -> bool {
        match self.transport.execute(&self.build_refresh()) {
            Ok(response) if response.is_success() => true,
            Ok(response) => {
                warn!(status = response.status, body = %response.body, "token refresh rejected");
                false
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed");
                false
            }
        }
    }

    /// `perform` with a payload of any serializable type.
    pub fn send_json<P: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        payload: &P,
    ) -> Result<Option<Value>, ApiError> {
        let payload =
            serde_json::to_value(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.perform(endpoint, method, Some(&payload))
    }

    /// `perform`, then decode the JSON body into `R`.
    pub fn perform_as<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        payload: Option<&Value>,
    ) -> Result<Option<R>, ApiError> {
        self.perform(endpoint, method, payload)?
            .map(|value| {
                serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
            })
            .transpose()
    }

    pub fn get(&self, endpoint: &str) -> Result<Option<Value>, ApiError> {
        self.perform(endpoint, HttpMethod::Get, None)
    }

    pub fn post<P: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &P,
    ) -> Result<Option<Value>, ApiError> {
        self.send_json(endpoint, HttpMethod::Post, payload)
    }

    pub fn put<P: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &P,
    ) -> Result<Option<Value>, ApiError> {
        self.send_json(endpoint, HttpMethod::Put, payload)
    }

    pub fn patch<P: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &P,
    ) -> Result<Option<Value>, ApiError> {
        self.send_json(endpoint, HttpMethod::Patch, payload)
    }

    pub fn delete(&self, endpoint: &str) -> Result<Option<Value>, ApiError> {
        self.perform(endpoint, HttpMethod::Delete, None)
    }
}

/// Map a final (non-401) response to the caller's result.
pub fn parse_response(response: HttpResponse) -> Result<Option<Value>, ApiError> {
    if !response.is_success() {
        return Err(ApiError::Http {
            status: response.status,
            body: response.body,
        });
    }
    Ok(serde_json::from_str(&response.body).ok())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::transport::ScriptedTransport;

    const BASE: &str = "http://localhost:8080/api";

    fn client(transport: &ScriptedTransport) -> ApiClient<&ScriptedTransport> {
        ApiClient::new(ClientConfig::new(BASE), transport)
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse::new(200, body)
    }

    fn unauthorized() -> HttpResponse {
        HttpResponse::new(401, "Unauthorized")
    }

    #[test]
    fn build_request_sets_json_header_and_credentials() {
        let transport = ScriptedTransport::default();
        let req = client(&transport)
            .build_request("/groups", HttpMethod::Get, None)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8080/api/groups");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        assert_eq!(req.credentials, Credentials::Include);
        assert!(req.body.is_none());
    }

    #[test]
    fn build_request_serializes_payload() {
        let transport = ScriptedTransport::default();
        let payload = json!({"name": "Tuesday group", "description": "weekly"});
        let req = client(&transport)
            .build_request("/groups", HttpMethod::Post, Some(&payload))
            .unwrap();
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, payload);
    }

    #[test]
    fn get_with_payload_is_rejected_before_any_io() {
        let transport = ScriptedTransport::default();
        let err = client(&transport)
            .perform("/groups", HttpMethod::Get, Some(&json!({"a": 1})))
            .unwrap_err();
        assert!(matches!(err, ApiError::BodyNotAllowed { method: HttpMethod::Get }));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn build_refresh_is_bodyless_post() {
        let transport = ScriptedTransport::default();
        let req = client(&transport).build_refresh();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:8080/api/refresh");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
        assert_eq!(req.credentials, Credentials::Include);
    }

    #[test]
    fn success_returns_parsed_body_unchanged() {
        let transport = ScriptedTransport::new([ok(r#"{"id":7,"tags":["a","b"]}"#)]);
        let value = client(&transport).get("/groups/7").unwrap();
        assert_eq!(value, Some(json!({"id": 7, "tags": ["a", "b"]})));
    }

    #[test]
    fn empty_success_body_is_none() {
        let transport = ScriptedTransport::new([HttpResponse::new(204, "")]);
        assert_eq!(client(&transport).delete("/groups/7").unwrap(), None);
    }

    #[test]
    fn non_json_success_body_is_none() {
        let transport = ScriptedTransport::new([ok("OK")]);
        assert_eq!(client(&transport).get("/health").unwrap(), None);
    }

    #[test]
    fn unauthorized_then_refresh_then_success_returns_retried_body() {
        let transport = ScriptedTransport::new([
            unauthorized(),
            HttpResponse::new(204, ""),
            ok(r#"[{"id":1}]"#),
        ]);
        let value = client(&transport).get("/groups").unwrap();
        assert_eq!(value, Some(json!([{"id": 1}])));

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].url, "http://localhost:8080/api/refresh");
        assert_eq!(requests[0], requests[2]);
    }

    #[test]
    fn retry_reissues_identical_payload() {
        let transport = ScriptedTransport::new([
            unauthorized(),
            HttpResponse::new(200, ""),
            HttpResponse::new(201, r#"{"id":3}"#),
        ]);
        client(&transport)
            .post("/groups", &json!({"name": "Evening"}))
            .unwrap();
        let requests = transport.requests();
        assert_eq!(requests[0], requests[2]);
        assert_eq!(requests[2].body.as_deref(), Some(r#"{"name":"Evening"}"#));
    }

    #[test]
    fn second_unauthorized_is_auth_expired() {
        let transport = ScriptedTransport::new([
            unauthorized(),
            HttpResponse::new(204, ""),
            unauthorized(),
        ]);
        let err = client(&transport).get("/groups").unwrap_err();
        assert!(matches!(err, ApiError::AuthExpired));
        assert_eq!(transport.requests().len(), 3);
    }

    #[test]
    fn failed_refresh_is_auth_expired_without_retry() {
        let transport = ScriptedTransport::new([unauthorized(), unauthorized()]);
        let err = client(&transport).get("/groups").unwrap_err();
        assert!(matches!(err, ApiError::AuthExpired));
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].url, "http://localhost:8080/api/refresh");
    }

    #[test]
    fn refresh_transport_failure_is_auth_expired() {
        let transport = ScriptedTransport::new([unauthorized()]).then_fail("connection reset");
        let err = client(&transport).get("/groups").unwrap_err();
        assert!(matches!(err, ApiError::AuthExpired));
    }

    #[test]
    fn refresh_reports_false_instead_of_erroring() {
        let transport = ScriptedTransport::new([HttpResponse::new(500, "boom")]);
        assert!(!client(&transport).refresh());

        let transport = ScriptedTransport::default().then_fail("dns failure");
        assert!(!client(&transport).refresh());
    }

    #[test]
    fn other_error_status_carries_body_text() {
        let transport = ScriptedTransport::new([HttpResponse::new(403, "Only admins can do that")]);
        let err = client(&transport).delete("/groups/9").unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 403, .. }));
        assert_eq!(err.to_string(), "Only admins can do that");
        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn transport_failure_propagates() {
        let transport = ScriptedTransport::default().then_fail("connection refused");
        let err = client(&transport).get("/groups").unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn perform_as_decodes_typed_body() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Group {
            id: u32,
            name: String,
        }

        let transport = ScriptedTransport::new([ok(r#"{"id":4,"name":"Choir"}"#)]);
        let group: Option<Group> = client(&transport)
            .perform_as("/groups/4", HttpMethod::Get, None)
            .unwrap();
        assert_eq!(
            group,
            Some(Group {
                id: 4,
                name: "Choir".to_string()
            })
        );
    }

    #[test]
    fn perform_as_reports_shape_mismatch() {
        let transport = ScriptedTransport::new([ok(r#"{"unexpected":true}"#)]);
        let err = client(&transport)
            .perform_as::<Vec<u32>>("/groups", HttpMethod::Get, None)
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
