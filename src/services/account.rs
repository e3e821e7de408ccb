// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Thin typed wrappers for the auth, user, and role endpoints.
//!
//! No workflow logic lives here; these exist so call sites get typed
//! payloads and the standard mutation-path semantics.

use crate::error::ApiError;
use crate::models::ResourceAction;
use crate::services::{ApiTransport, IdentityService, MutationOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Payload for `POST /auth/signup`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub user_name: String,
    #[validate(length(min = 1, max = 100))]
    pub tenant_name: String,
}

/// Payload for `POST /users/invite`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct InviteRequest {
    #[validate(email)]
    pub email: String,
    pub role_id: String,
}

/// A role as returned by `GET /roles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub permissions: Vec<ResourceAction>,
}

/// Session lifecycle operations.
pub struct AuthService {
    transport: Arc<ApiTransport>,
    identity: Arc<IdentityService>,
}

impl AuthService {
    pub fn new(transport: Arc<ApiTransport>, identity: Arc<IdentityService>) -> Self {
        Self {
            transport,
            identity,
        }
    }

    /// Log out and drop the cached identity.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.transport.attempt_logout().await?;
        self.identity.invalidate();
        Ok(())
    }

    /// Check a password-reset token before rendering the reset form.
    pub async fn verify_reset_token(&self, token: &str) -> Result<MutationOutcome, ApiError> {
        let body = serde_json::json!({ "token": token });
        self.transport
            .mutation_post("/auth/verify-reset-token", Some(&body))
            .await
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<MutationOutcome, AccountError> {
        request.validate()?;
        let body = serde_json::json!({
            "email": request.email,
            "user_name": request.user_name,
            "tenant_name": request.tenant_name,
        });
        Ok(self
            .transport
            .mutation_post("/auth/signup", Some(&body))
            .await?)
    }
}

/// User management operations.
pub struct UserService {
    transport: Arc<ApiTransport>,
}

impl UserService {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    pub async fn invite(&self, request: &InviteRequest) -> Result<MutationOutcome, AccountError> {
        request.validate()?;
        let body = serde_json::json!({
            "email": request.email,
            "role_id": request.role_id,
        });
        Ok(self
            .transport
            .mutation_post("/users/invite", Some(&body))
            .await?)
    }

    /// Replace a user's role assignments.
    pub async fn update_roles(
        &self,
        user_id: &str,
        role_ids: &[String],
    ) -> Result<MutationOutcome, ApiError> {
        let body = serde_json::json!({ "role_ids": role_ids });
        self.transport
            .mutation_post(&format!("/users/{user_id}/roles"), Some(&body))
            .await
    }
}

/// Role catalogue, read-only from the client's perspective.
pub struct RoleService {
    transport: Arc<ApiTransport>,
}

impl RoleService {
    pub fn new(transport: Arc<ApiTransport>) -> Self {
        Self { transport }
    }

    pub async fn list(&self) -> Result<Vec<Role>, ApiError> {
        let response = self.transport.load_get("/roles").await?;
        response.json().await.map_err(ApiError::Network)
    }

    /// All permission strings the backend knows about.
    pub async fn list_permissions(&self) -> Result<Vec<ResourceAction>, ApiError> {
        let response = self.transport.load_get("/roles/permissions").await?;
        response.json().await.map_err(ApiError::Network)
    }
}

/// Errors from account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Invalid input: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Api(#[from] ApiError),
}
