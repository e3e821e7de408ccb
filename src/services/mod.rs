// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - client-side logic layer.

pub mod account;
pub mod fetch;
pub mod identity;
pub mod notifications;
pub mod whitelist;

pub use account::{AccountError, AuthService, RoleService, UserService};
pub use fetch::{ApiTransport, Credentials, LoadOptions, MutationOutcome, GENERIC_ERROR_TOAST};
pub use identity::{IdentityService, RouteClass, SessionState};
pub use notifications::ToastQueue;
pub use whitelist::{
    evaluate_activation_hint, ActivationHint, ActivationOutcome, ActivationState, DeleteOutcome,
    EmergencyError, WhitelistError, WhitelistService,
};
