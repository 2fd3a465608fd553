//! The single re-authentication attempt a request is allowed.
//!
//! A request starts in `Initial`. The first 401 spends the refresh: on
//! success the request is retried once, on failure it is abandoned. Any
//! 401 after that ends the request without touching the refresh endpoint
//! again.

/// Where a request stands with respect to re-authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Initial,
    RefreshAttempted,
}

/// What to do after a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    Retry,
    Expired,
}

impl AuthPhase {
    /// Advance on a 401 response. `refresh` runs only from `Initial`.
    pub fn on_unauthorized(self, refresh: impl FnOnce() -> bool) -> (AuthPhase, AuthDecision) {
        match self {
            AuthPhase::Initial => {
                let decision = if refresh() {
                    AuthDecision::Retry
                } else {
                    AuthDecision::Expired
                };
                (AuthPhase::RefreshAttempted, decision)
            }
            AuthPhase::RefreshAttempted => (AuthPhase::RefreshAttempted, AuthDecision::Expired),
        }
    }
}
