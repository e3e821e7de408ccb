// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! IP whitelist workflows.
//!
//! The activation workflow gives the operator immediate feedback on
//! whether enabling the whitelist would lock them out, but the backend
//! always re-validates: the client's notion of "current IP" comes from
//! forwarded headers and is a UX hint, not a security boundary.
//!
//! States: `Inactive → Evaluating → {Active | UnsafeWarning}`, with
//! `UnsafeWarning → {Cancel → Inactive | Force → Active}`, and
//! `Active → ConfirmDeactivate → Inactive`.

use crate::error::{ApiError, NavigationIntent};
use crate::models::{
    ActivationResponse, CreateRuleRequest, EmergencyDeactivationToken, IpWhitelistRule,
    UpdateLabelRequest,
};
use crate::services::{ApiTransport, IdentityService, MutationOutcome};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use validator::Validate;

const LIST_PATH: &str = "/ip-whitelist";
const CREATE_PATH: &str = "/ip-whitelist/create";
const ACTIVATE_PATH: &str = "/ip-whitelist/activate";
const DEACTIVATE_PATH: &str = "/ip-whitelist/deactivate";
const EMERGENCY_PATH: &str = "/ip-whitelist/emergency-deactivate";

/// Client-side view of the activation workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationState {
    Inactive,
    /// Activation requested; waiting for the backend's safety verdict.
    Evaluating,
    /// The backend reported the operator's IP is not covered. The UI
    /// must render a blocking confirmation naming that IP.
    UnsafeWarning { blocked_ip: String },
    Active,
    /// Deactivation requested; advisory confirmation pending. Always
    /// "safe" since deactivating only loosens restrictions.
    ConfirmDeactivate,
}

/// Result of an activation request.
#[derive(Debug)]
pub enum ActivationOutcome {
    /// Committed. The identity refresh is armed and the rule list
    /// re-fetched best-effort; `rules` is `None` when the re-list
    /// failed, e.g. because a forced activation locked this operator
    /// out of the API.
    Committed { rules: Option<Vec<IpWhitelistRule>> },
    /// Not committed: the operator's IP matched no rule.
    LockoutWarning { blocked_ip: String },
}

/// Result of a delete request. The confirmation dialog closes only on
/// success; a rejected delete (e.g. the rule covering the operator's
/// own IP while the whitelist is active) leaves it open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub success: bool,
    pub dialog_open: bool,
}

/// Pure activation-safety verdict, computed client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationHint {
    Safe,
    Lockout { blocked_ip: IpAddr },
}

/// Errors from whitelist operations.
#[derive(Debug, thiserror::Error)]
pub enum WhitelistError {
    #[error("Invalid input: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Workflow is in state {0:?}, operation not applicable")]
    InvalidTransition(ActivationState),

    #[error("Malformed activation response")]
    MalformedResponse,
}

/// Errors from the emergency-deactivation side channel. Both are
/// terminal from the client's perspective; the failure view offers no
/// retry beyond contacting support.
#[derive(Debug, thiserror::Error)]
pub enum EmergencyError {
    #[error("Deactivation link rejected (HTTP {status})")]
    Rejected { status: u16 },

    #[error("Service unavailable")]
    Unavailable,
}

/// Whitelist CRUD plus the activation workflow state machine.
pub struct WhitelistService {
    transport: Arc<ApiTransport>,
    identity: Arc<IdentityService>,
    state: Mutex<ActivationState>,
}

impl WhitelistService {
    pub fn new(transport: Arc<ApiTransport>, identity: Arc<IdentityService>) -> Self {
        Self {
            transport,
            identity,
            state: Mutex::new(ActivationState::Inactive),
        }
    }

    /// Current workflow state.
    pub fn state(&self) -> ActivationState {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_state(&self, next: ActivationState) {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = next;
    }

    /// Align the local state with the backend's activation flag, e.g.
    /// on page load. The backend owns the truth.
    pub fn sync_active(&self, active: bool) {
        self.set_state(if active {
            ActivationState::Active
        } else {
            ActivationState::Inactive
        });
    }

    /// Fetch the rule list. Read-through on every call, never cached.
    pub async fn list_rules(&self) -> Result<Vec<IpWhitelistRule>, ApiError> {
        let response = self.transport.load_get(LIST_PATH).await?;
        response.json().await.map_err(ApiError::Network)
    }

    /// Create a rule. Input is validated before the round-trip.
    pub async fn create_rule(
        &self,
        ip_address: &str,
        label: Option<&str>,
    ) -> Result<MutationOutcome, WhitelistError> {
        let request = CreateRuleRequest {
            ip_address: ip_address.to_string(),
            label: label.map(str::to_string),
        };
        request.validate()?;

        let body = serde_json::json!({
            "ip_address": request.ip_address,
            "label": request.label,
        });
        Ok(self.transport.mutation_post(CREATE_PATH, Some(&body)).await?)
    }

    /// Delete a rule. On failure no local state is touched and the
    /// confirmation dialog stays open.
    pub async fn delete_rule(&self, rule_id: &str) -> Result<DeleteOutcome, WhitelistError> {
        let path = format!("{LIST_PATH}/{rule_id}/delete");
        let outcome = self.transport.mutation_post(&path, None).await?;
        Ok(DeleteOutcome {
            success: outcome.success,
            dialog_open: !outcome.success,
        })
    }

    /// Update a rule's label.
    pub async fn update_label(
        &self,
        rule_id: &str,
        label: &str,
    ) -> Result<MutationOutcome, WhitelistError> {
        let request = UpdateLabelRequest {
            label: label.to_string(),
        };
        request.validate()?;

        let path = format!("{LIST_PATH}/{rule_id}/label/update");
        let body = serde_json::json!({ "label": request.label });
        Ok(self.transport.mutation_post(&path, Some(&body)).await?)
    }

    /// Toggle to active. Only valid from `Inactive`; moves through
    /// `Evaluating` and lands in `Active` or `UnsafeWarning`.
    pub async fn toggle_activate(&self) -> Result<ActivationOutcome, WhitelistError> {
        if self.state() != ActivationState::Inactive {
            return Err(WhitelistError::InvalidTransition(self.state()));
        }
        self.set_state(ActivationState::Evaluating);
        self.request_activation(false).await
    }

    /// Commit activation despite the lockout warning. Only valid from
    /// `UnsafeWarning`; the operator may be activating on behalf of a
    /// different network, so this commits even though it will lock the
    /// current operator out.
    pub async fn force_activate(&self) -> Result<ActivationOutcome, WhitelistError> {
        match self.state() {
            ActivationState::UnsafeWarning { .. } => {}
            other => return Err(WhitelistError::InvalidTransition(other)),
        }
        self.set_state(ActivationState::Evaluating);
        self.request_activation(true).await
    }

    /// Dismiss the lockout warning with no state change committed.
    pub fn cancel_warning(&self) -> Result<ActivationState, WhitelistError> {
        match self.state() {
            ActivationState::UnsafeWarning { .. } => {
                self.set_state(ActivationState::Inactive);
                Ok(ActivationState::Inactive)
            }
            other => Err(WhitelistError::InvalidTransition(other)),
        }
    }

    /// Toggle to inactive: opens the advisory confirmation.
    pub fn toggle_deactivate(&self) -> Result<ActivationState, WhitelistError> {
        match self.state() {
            ActivationState::Active => {
                self.set_state(ActivationState::ConfirmDeactivate);
                Ok(ActivationState::ConfirmDeactivate)
            }
            other => Err(WhitelistError::InvalidTransition(other)),
        }
    }

    /// Confirm deactivation. Unconditional: it only broadens access.
    pub async fn confirm_deactivate(&self) -> Result<ActivationState, WhitelistError> {
        if self.state() != ActivationState::ConfirmDeactivate {
            return Err(WhitelistError::InvalidTransition(self.state()));
        }

        let outcome = self.transport.mutation_post(DEACTIVATE_PATH, None).await?;
        if let Some(NavigationIntent::Login) = outcome.navigation {
            return Err(ApiError::SessionExpired.into());
        }
        if !outcome.success {
            // Toast already enqueued by the transport; stay put.
            self.set_state(ActivationState::Active);
            return Err(api_error_for(outcome.status).into());
        }

        self.set_state(ActivationState::Inactive);
        Ok(ActivationState::Inactive)
    }

    /// Keep the whitelist active, dismissing the confirmation.
    pub fn cancel_deactivate(&self) -> Result<ActivationState, WhitelistError> {
        match self.state() {
            ActivationState::ConfirmDeactivate => {
                self.set_state(ActivationState::Active);
                Ok(ActivationState::Active)
            }
            other => Err(WhitelistError::InvalidTransition(other)),
        }
    }

    async fn request_activation(&self, force: bool) -> Result<ActivationOutcome, WhitelistError> {
        let body = serde_json::json!({ "force": force });
        let outcome = self.transport.mutation_post(ACTIVATE_PATH, Some(&body)).await;

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                self.set_state(ActivationState::Inactive);
                return Err(err.into());
            }
        };

        if let Some(NavigationIntent::Login) = outcome.navigation {
            self.set_state(ActivationState::Inactive);
            return Err(ApiError::SessionExpired.into());
        }
        if !outcome.success {
            self.set_state(ActivationState::Inactive);
            return Err(api_error_for(outcome.status).into());
        }

        let response: ActivationResponse = outcome
            .body
            .and_then(|body| serde_json::from_value(body).ok())
            .ok_or(WhitelistError::MalformedResponse)?;

        if response.activated {
            // The backend has committed; local state must reflect that
            // before any follow-up round-trips, which a forced
            // activation may already have locked out.
            self.set_state(ActivationState::Active);
            // Permission and feature state may depend on the whitelist,
            // so the next identity read must hit the backend.
            self.identity.force_refresh();
            let rules = match self.list_rules().await {
                Ok(rules) => Some(rules),
                Err(err) => {
                    tracing::warn!(error = %err, "Rule re-list after activation failed");
                    None
                }
            };
            return Ok(ActivationOutcome::Committed { rules });
        }

        let blocked_ip = response
            .requester_ip
            .ok_or(WhitelistError::MalformedResponse)?;
        tracing::info!(%blocked_ip, "Activation would lock out the operator");
        self.set_state(ActivationState::UnsafeWarning {
            blocked_ip: blocked_ip.clone(),
        });
        Ok(ActivationOutcome::LockoutWarning { blocked_ip })
    }

    /// Deactivate via the out-of-band token, without session auth: the
    /// token itself is the credential. Success navigates to the
    /// whitelist settings page; failure is terminal.
    pub async fn emergency_deactivate(
        &self,
        token: &EmergencyDeactivationToken,
    ) -> Result<NavigationIntent, EmergencyError> {
        let path = format!(
            "{EMERGENCY_PATH}?token={}",
            urlencoding::encode(token.as_str())
        );

        let response = match self.transport.bare_post(&path).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "Emergency deactivation transport failure");
                return Err(EmergencyError::Unavailable);
            }
        };

        let status = response.status();
        if status.is_success() {
            self.set_state(ActivationState::Inactive);
            return Ok(NavigationIntent::WhitelistSettings);
        }

        tracing::warn!(status = status.as_u16(), "Emergency deactivation rejected");
        Err(EmergencyError::Rejected {
            status: status.as_u16(),
        })
    }
}

/// Client-side activation-safety hint: `Safe` iff the operator's IP is
/// covered by some rule. Deterministic in `(ip, rules)`, and explicitly
/// non-authoritative; the backend's verdict always wins.
pub fn evaluate_activation_hint(
    operator_ip: IpAddr,
    rules: &[IpWhitelistRule],
) -> ActivationHint {
    if rules.iter().any(|rule| rule.ip_address.contains(operator_ip)) {
        ActivationHint::Safe
    } else {
        ActivationHint::Lockout {
            blocked_ip: operator_ip,
        }
    }
}

fn api_error_for(status: u16) -> ApiError {
    match status {
        403 => ApiError::Forbidden,
        404 => ApiError::NotFound,
        s if s >= 500 => ApiError::Server { status: s },
        s => ApiError::Client { status: s },
    }
}
