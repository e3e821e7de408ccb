// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated API transport.
//!
//! Two entry points with different failure contracts:
//! - [`ApiTransport::load_fetch`]: page-data loading. Failures become
//!   [`ApiError`] values meant for the page-level error boundary; callers
//!   must not swallow them except to re-signal a redirect.
//! - [`ApiTransport::mutation_fetch`]: user-initiated writes. Failures
//!   are recovered locally (error toast + `success: false`) so the
//!   current page and form state survive for correction.
//!
//! Session cookies ride on every request by default; the cookie store is
//! the `credentials: "include"` of this runtime.

use crate::config::Config;
use crate::error::{ApiError, NavigationIntent};
use crate::services::ToastQueue;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response};
use std::sync::Arc;
use std::time::Duration;

/// Toast shown when a failure carries no usable message.
pub const GENERIC_ERROR_TOAST: &str = "Something went wrong. Please try again.";

const LOGOUT_PATH: &str = "/auth/logout";

/// Whether the session cookie jar is attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Credentials {
    #[default]
    Include,
    Omit,
}

/// Per-call options for the load path.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub credentials: Credentials,
    /// Treat 404 as a valid empty-result state and hand the raw
    /// response back instead of failing with `NotFound`.
    pub allow_not_found: bool,
}

/// Result of a mutation call. Never constructed for transport failures;
/// those surface as `ApiError::Network` after a generic toast.
#[derive(Debug)]
pub struct MutationOutcome {
    pub status: u16,
    pub success: bool,
    /// Parsed JSON body, when the response carried one.
    pub body: Option<serde_json::Value>,
    /// Set only on the 401 path, which abandons in-page state.
    pub navigation: Option<NavigationIntent>,
}

/// HTTP transport shared by all services in an application context.
pub struct ApiTransport {
    /// Session client: cookie store enabled.
    http: reqwest::Client,
    /// Cookie-less client for calls that opt out of session auth.
    bare: reqwest::Client,
    base_url: String,
    toasts: Arc<ToastQueue>,
}

impl ApiTransport {
    pub fn new(config: &Config, toasts: Arc<ToastQueue>) -> Result<Self, ApiError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;
        let bare = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            bare,
            base_url: config.api_base_url.clone(),
            toasts,
        })
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn client(&self, credentials: Credentials) -> &reqwest::Client {
        match credentials {
            Credentials::Include => &self.http,
            Credentials::Omit => &self.bare,
        }
    }

    /// Load-path GET with default options.
    pub async fn load_get(&self, path: &str) -> Result<Response, ApiError> {
        self.load_fetch(Method::GET, path, LoadOptions::default())
            .await
    }

    /// Load-path fetch. Classifies the response in priority order and
    /// returns the raw response only when the caller owns body parsing.
    pub async fn load_fetch(
        &self,
        method: Method,
        path: &str,
        options: LoadOptions,
    ) -> Result<Response, ApiError> {
        let response = match self
            .client(options.credentials)
            .request(method, self.url(path))
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(path, error = %err, "Load fetch transport failure");
                return Err(ApiError::ServiceUnavailable);
            }
        };

        let status = response.status();
        if status.is_server_error() {
            return Err(ApiError::Server {
                status: status.as_u16(),
            });
        }
        match status.as_u16() {
            404 if !options.allow_not_found => Err(ApiError::NotFound),
            403 => Err(ApiError::Forbidden),
            401 => {
                // Exactly one logout attempt, then terminate in either
                // SessionExpired (redirect) or ServiceUnavailable.
                match self.attempt_logout().await {
                    Ok(()) => Err(ApiError::SessionExpired),
                    Err(err) => {
                        tracing::warn!(error = %err, "Logout failed during 401 cleanup");
                        Err(ApiError::ServiceUnavailable)
                    }
                }
            }
            _ => Ok(response),
        }
    }

    /// Mutation-path POST with a JSON body.
    pub async fn mutation_post(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<MutationOutcome, ApiError> {
        self.mutation_fetch(Method::POST, path, body, Credentials::Include)
            .await
    }

    /// Mutation-path fetch. Stays on the current page for every failure
    /// except 401, which logs out and signals a hard login navigation.
    pub async fn mutation_fetch(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        credentials: Credentials,
    ) -> Result<MutationOutcome, ApiError> {
        let mut request = self.client(credentials).request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(path, error = %err, "Mutation transport failure");
                self.toasts.show_error(GENERIC_ERROR_TOAST);
                return Err(ApiError::Network(err));
            }
        };

        let status = response.status().as_u16();

        if status == 401 {
            // Best-effort cleanup; failure is logged but never blocks
            // the redirect to login.
            if let Err(err) = self.attempt_logout().await {
                tracing::warn!(error = %err, "Logout failed during 401 cleanup");
            }
            return Ok(MutationOutcome {
                status,
                success: false,
                body: None,
                navigation: Some(NavigationIntent::Login),
            });
        }

        let success = response.status().is_success();
        let body = Self::json_body(response).await;

        if !success {
            match body.as_ref().and_then(|b| b.get("error")).and_then(|e| e.as_str()) {
                Some(message) => self.toasts.show_error(message),
                None => self.toasts.show_error(GENERIC_ERROR_TOAST),
            };
        }

        Ok(MutationOutcome {
            status,
            success,
            body,
            navigation: None,
        })
    }

    /// One-off POST without session cookies and without mutation-path
    /// side effects (no toasts, no logout-on-401). Used where a bearer
    /// credential in the request itself is the only auth, e.g. the
    /// emergency-deactivation token.
    pub async fn bare_post(&self, path: &str) -> Result<Response, ApiError> {
        Ok(self.bare.post(self.url(path)).send().await?)
    }

    /// Invalidate the session cookie server-side.
    pub async fn attempt_logout(&self) -> Result<(), ApiError> {
        let response = self.http.post(self.url(LOGOUT_PATH)).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(if status.is_server_error() {
            ApiError::Server {
                status: status.as_u16(),
            }
        } else {
            ApiError::Client {
                status: status.as_u16(),
            }
        })
    }

    /// Parse the body as JSON when the content type says it is JSON.
    async fn json_body(response: Response) -> Option<serde_json::Value> {
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);
        if !is_json {
            return None;
        }
        response.json().await.ok()
    }
}
