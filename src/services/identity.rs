// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session identity cache.
//!
//! A single mutable slot holding the current user's [`Me`], plus a
//! one-shot force-refresh flag. Each in-flight `/me` fetch is stamped
//! with a generation; `invalidate()` and `force_refresh()` bump it, so
//! a response that lands after the caller moved on is discarded instead
//! of clobbering the cache.

use crate::error::{ApiError, NavigationIntent};
use crate::models::Me;
use crate::services::ApiTransport;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

const ME_PATH: &str = "/me";

/// Route categories with distinct session-resolution behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// `/auth/*`: must stay reachable for login, never hard-redirects.
    Auth,
    /// `/verify/*` and the error page: bypass identity loading entirely,
    /// avoiding the lockout where fetching identity itself returns 403.
    Verify,
    /// Everything else: requires an authenticated identity.
    Protected,
}

/// Outcome of the layout-load decision.
#[derive(Debug, Clone)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Me),
    /// A fetch is in flight; hosts render a pending state.
    Loading,
    /// Identity could not be resolved on a route that stays in place.
    Error { status: u16, message: String },
}

/// Cache of the current user's identity and permissions.
pub struct IdentityService {
    transport: Arc<ApiTransport>,
    slot: RwLock<Option<Me>>,
    force_refresh: AtomicBool,
    generation: AtomicU64,
}

impl IdentityService {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self {
            transport,
            slot: RwLock::new(None),
            force_refresh: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    /// Current cached identity, if any. Never triggers a fetch.
    pub fn cached(&self) -> Option<Me> {
        self.slot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Return the cached identity, fetching `/me` when the slot is empty
    /// or a force refresh is armed. Load-path errors propagate.
    pub async fn read(&self) -> Result<Me, ApiError> {
        // One-shot: consuming the flag clears it.
        let bypass = self.force_refresh.swap(false, Ordering::SeqCst);
        if !bypass {
            if let Some(me) = self.cached() {
                return Ok(me);
            }
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let response = match self.transport.load_get(ME_PATH).await {
            Ok(response) => response,
            Err(err) => {
                // A confirmed 401 means whatever we had cached is gone.
                if matches!(err, ApiError::SessionExpired) {
                    self.invalidate();
                }
                return Err(err);
            }
        };
        let me: Me = response.json().await.map_err(ApiError::Network)?;

        if self.generation.load(Ordering::SeqCst) == generation {
            *self
                .slot
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(me.clone());
        } else {
            // The caller navigated away or logged out while this fetch
            // was in flight; the cache must not see the stale value.
            tracing::debug!(user = %me.user_id, "Discarding stale identity response");
        }

        Ok(me)
    }

    /// Clear the slot and disarm the refresh flag (logout path).
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self
            .slot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        self.force_refresh.store(false, Ordering::SeqCst);
    }

    /// Arm the one-shot flag so the next `read()` bypasses the cache.
    pub fn force_refresh(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.force_refresh.store(true, Ordering::SeqCst);
    }

    /// Resolve the session for a route category.
    ///
    /// Protected routes turn load failures into explicit navigation:
    /// login on an expired session, otherwise the full-page error
    /// boundary carrying status and message.
    pub async fn resolve_route(
        &self,
        route: RouteClass,
    ) -> Result<SessionState, NavigationIntent> {
        match route {
            RouteClass::Verify => Ok(SessionState::Unauthenticated),
            RouteClass::Auth => match self.read().await {
                Ok(me) => Ok(SessionState::Authenticated(me)),
                Err(ApiError::SessionExpired) => Ok(SessionState::Unauthenticated),
                Err(err) => Ok(SessionState::Error {
                    status: err.status_code(),
                    message: err.to_string(),
                }),
            },
            RouteClass::Protected => match self.read().await {
                Ok(me) => Ok(SessionState::Authenticated(me)),
                Err(ApiError::SessionExpired) => Err(NavigationIntent::Login),
                Err(err) => Err(NavigationIntent::ErrorPage {
                    status: err.status_code(),
                    message: err.to_string(),
                }),
            },
        }
    }
}
