// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Permission and feature gate.
//!
//! Pure functions over [`Me`]. No caching: the identity can change
//! underneath (e.g. after a role edit), so gates are re-evaluated on
//! every render.

use crate::models::{Action, Me, ResourceAction};

/// Whether the identity holds a permission. `edit` implies `view` on
/// the same resource; the implication is computed here, never stored.
pub fn has_permission(me: &Me, wanted: ResourceAction) -> bool {
    if me.permissions.contains(&wanted) {
        return true;
    }
    wanted.action == Action::View
        && me
            .permissions
            .contains(&ResourceAction::new(wanted.resource, Action::Edit))
}

/// Whether a tenant-level enterprise feature is enabled.
pub fn has_feature(me: &Me, feature: &str) -> bool {
    me.enterprise_features
        .get(feature)
        .map(|f| f.enabled)
        .unwrap_or(false)
}
