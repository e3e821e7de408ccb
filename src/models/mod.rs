// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the client runtime.

pub mod cidr;
pub mod me;
pub mod toast;
pub mod whitelist;

pub use cidr::{Cidr, CidrParseError};
pub use me::{Action, EnterpriseFeature, Me, Resource, ResourceAction};
pub use toast::{Toast, ToastMode};
pub use whitelist::{
    ActivationResponse, CreateRuleRequest, EmergencyDeactivationToken, IpWhitelistRule,
    UpdateLabelRequest,
};
