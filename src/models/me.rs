// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Current-user identity as returned by `GET /me`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// The current user's identity and authorization context.
///
/// At most one instance is live per application context, owned by the
/// identity cache. Invalidated on logout, 401, or an explicit refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Me {
    pub user_id: String,
    pub email: String,
    pub user_name: String,
    pub tenant_name: String,
    pub tenant_plan: String,
    /// Granted permissions. `view` is NOT stored redundantly when `edit`
    /// is granted; the gate derives it at query time.
    pub permissions: HashSet<ResourceAction>,
    /// Tenant-level feature flags gating premium functionality.
    #[serde(default)]
    pub enterprise_features: HashMap<String, EnterpriseFeature>,
}

/// A tenant-level feature flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnterpriseFeature {
    pub enabled: bool,
}

/// Resources a permission can apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Tenant,
    Users,
    Roles,
    IpWhitelist,
}

impl Resource {
    fn as_str(&self) -> &'static str {
        match self {
            Resource::Tenant => "tenant",
            Resource::Users => "users",
            Resource::Roles => "roles",
            Resource::IpWhitelist => "ip_whitelist",
        }
    }
}

/// Actions a permission grants on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    Edit,
}

impl Action {
    fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Edit => "edit",
        }
    }
}

/// A granted permission, serialized on the wire as `"resource.action"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceAction {
    pub resource: Resource,
    pub action: Action,
}

impl ResourceAction {
    pub fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }
}

impl fmt::Display for ResourceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource.as_str(), self.action.as_str())
    }
}

/// Error parsing a `"resource.action"` permission string.
#[derive(Debug, thiserror::Error)]
#[error("Invalid permission string: {0}")]
pub struct ParseResourceActionError(String);

impl FromStr for ResourceAction {
    type Err = ParseResourceActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (resource, action) = s
            .split_once('.')
            .ok_or_else(|| ParseResourceActionError(s.to_string()))?;

        let resource = match resource {
            "tenant" => Resource::Tenant,
            "users" => Resource::Users,
            "roles" => Resource::Roles,
            "ip_whitelist" => Resource::IpWhitelist,
            _ => return Err(ParseResourceActionError(s.to_string())),
        };
        let action = match action {
            "view" => Action::View,
            "edit" => Action::Edit,
            _ => return Err(ParseResourceActionError(s.to_string())),
        };

        Ok(Self { resource, action })
    }
}

impl Serialize for ResourceAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
