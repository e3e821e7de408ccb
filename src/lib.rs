// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Shared client runtime for the tenant and admin consoles.
//!
//! This crate owns the client-side logic the UIs share: the
//! authenticated API transport with its two failure contracts, the
//! session identity cache, the toast notification queue, the IP
//! whitelist activation workflow, and the permission/feature gate.
//! All services are explicitly constructed per [`AppContext`], so tests
//! run against isolated instances.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod permissions;
pub mod services;

use config::Config;
use error::ApiError;
use services::{
    ApiTransport, AuthService, IdentityService, RoleService, ToastQueue, UserService,
    WhitelistService,
};
use std::sync::Arc;

/// One application context: the full set of wired services.
pub struct AppContext {
    pub config: Config,
    pub toasts: Arc<ToastQueue>,
    pub transport: Arc<ApiTransport>,
    pub identity: Arc<IdentityService>,
    pub whitelist: Arc<WhitelistService>,
    pub auth: AuthService,
    pub users: UserService,
    pub roles: RoleService,
}

impl AppContext {
    /// Wire up all services against one backend.
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let toasts = Arc::new(ToastQueue::new());
        let transport = Arc::new(ApiTransport::new(&config, toasts.clone())?);
        let identity = Arc::new(IdentityService::new(transport.clone()));
        let whitelist = Arc::new(WhitelistService::new(transport.clone(), identity.clone()));
        let auth = AuthService::new(transport.clone(), identity.clone());
        let users = UserService::new(transport.clone());
        let roles = RoleService::new(transport.clone());

        Ok(Self {
            config,
            toasts,
            transport,
            identity,
            whitelist,
            auth,
            users,
            roles,
        })
    }
}
