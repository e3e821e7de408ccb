// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! IP whitelist wire types.

use crate::models::Cidr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A whitelist entry as returned by `GET /ip-whitelist`.
///
/// Owned by the backend; the client holds a read-through list fetched
/// per page view and never caches it across navigations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpWhitelistRule {
    pub id: String,
    pub tenant_id: String,
    /// Normalized CIDR (the backend normalizes on create).
    pub ip_address: Cidr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for `POST /ip-whitelist/create`.
///
/// Validated client-side before the round-trip as a UX hint only; the
/// backend re-validates and normalizes.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateRuleRequest {
    #[validate(custom(function = validate_cidr))]
    pub ip_address: String,
    #[validate(length(max = 100, message = "label must be at most 100 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Payload for `POST /ip-whitelist/{id}/label/update`.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct UpdateLabelRequest {
    #[validate(length(max = 100, message = "label must be at most 100 characters"))]
    pub label: String,
}

fn validate_cidr(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Cidr>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("cidr").with_message("invalid IP address or CIDR".into()))
}

/// Body of `POST /ip-whitelist/activate`.
///
/// A requester-IP mismatch is NOT a hard failure: the backend answers
/// 200 with `activated: false` and names the IP that would be locked
/// out, so the client can render the blocking confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationResponse {
    pub activated: bool,
    /// The requester's IP as seen by the server, present on mismatch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_ip: Option<String>,
}

/// Opaque out-of-band bearer credential for emergency deactivation.
/// The client never inspects it; expiry and single-use are enforced by
/// the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmergencyDeactivationToken(String);

impl EmergencyDeactivationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
