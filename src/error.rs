// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error taxonomy and explicit navigation intents.
//!
//! Every backend response is classified into exactly one [`ApiError`]
//! variant; callers match exhaustively instead of probing response shapes.
//! Redirects are plain values ([`NavigationIntent`]) threaded through
//! return types, never control-flow transfers.

/// Classified failure of a backend call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure (DNS, connect, TLS, body read).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream returned 5xx.
    #[error("Server error (HTTP {status})")]
    Server { status: u16 },

    /// Upstream returned a 4xx other than 401/403/404.
    #[error("Request rejected (HTTP {status})")]
    Client { status: u16 },

    /// Upstream returned 403.
    #[error("Forbidden")]
    Forbidden,

    /// Upstream returned 404 in a context where a resource was required.
    #[error("Resource not found")]
    NotFound,

    /// Upstream returned 401 and the cleanup logout succeeded.
    /// Caller contract: redirect to login.
    #[error("Session expired")]
    SessionExpired,

    /// Transport failed on the load path, or the 401-cleanup logout
    /// itself failed. Signals a retryable transient condition.
    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl ApiError {
    /// Status code carried to the error page. Transport-level failures
    /// surface as 503 since no upstream status exists.
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Network(_) => 503,
            ApiError::Server { status } => *status,
            ApiError::Client { status } => *status,
            ApiError::Forbidden => 403,
            ApiError::NotFound => 404,
            ApiError::SessionExpired => 401,
            ApiError::ServiceUnavailable => 503,
        }
    }
}

/// Where the host UI must navigate next.
///
/// Returned in the error position of load-path results and carried on
/// mutation outcomes, so every exit path is visible at the type level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationIntent {
    /// Hard navigation to the login page, abandoning in-page state.
    Login,
    /// Full-page error boundary with the upstream status and message.
    ErrorPage { status: u16, message: String },
    /// The IP whitelist settings page (after emergency deactivation).
    WhitelistSettings,
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;
