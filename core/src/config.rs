//! Client configuration.
//!
//! The base URL is fixed when the crate is built: set `API_BASE_URL` in the
//! build environment to point a deployment elsewhere. There is no runtime
//! lookup. Tests construct a `ClientConfig` directly to target a mock server.

/// Base URL used when `API_BASE_URL` is not set at build time.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Endpoint, relative to the base URL, that renews the session cookies.
pub const DEFAULT_REFRESH_ENDPOINT: &str = "/refresh";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    refresh_endpoint: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            refresh_endpoint: DEFAULT_REFRESH_ENDPOINT.to_string(),
        }
    }

    pub fn with_refresh_endpoint(mut self, endpoint: &str) -> Self {
        self.refresh_endpoint = endpoint.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Compose the absolute URL for `endpoint` by plain concatenation.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    pub fn refresh_url(&self) -> String {
        self.url_for(&self.refresh_endpoint)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(option_env!("API_BASE_URL").unwrap_or(DEFAULT_BASE_URL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new("http://localhost:3000/api/");
        assert_eq!(config.url_for("/groups"), "http://localhost:3000/api/groups");
    }

    #[test]
    fn refresh_url_defaults_to_refresh_endpoint() {
        let config = ClientConfig::new("http://localhost:3000/api");
        assert_eq!(config.refresh_url(), "http://localhost:3000/api/refresh");
    }

    #[test]
    fn refresh_endpoint_can_be_overridden() {
        let config = ClientConfig::new("http://h").with_refresh_endpoint("/auth/renew");
        assert_eq!(config.refresh_url(), "http://h/auth/renew");
    }

    #[test]
    fn endpoint_is_concatenated_verbatim() {
        let config = ClientConfig::new("http://h/api");
        assert_eq!(config.url_for("/groups?limit=10"), "http://h/api/groups?limit=10");
    }
}
