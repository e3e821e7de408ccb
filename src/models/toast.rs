// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ephemeral user-facing notification messages.

use serde::{Deserialize, Serialize};

/// A single notification. Ids are assigned from a queue-lifetime
/// monotonic counter and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub id: u64,
    pub text: String,
    pub mode: ToastMode,
}

/// Visual treatment of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastMode {
    Success,
    Error,
    Info,
}
