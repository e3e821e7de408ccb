// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Toast notification queue.
//!
//! Explicitly constructed and dependency-injected (one instance per
//! application context) so tests can run against isolated queues.

use crate::models::{Toast, ToastMode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Ordered queue of ephemeral notifications.
///
/// FIFO by insertion, removal by id. Duplicate texts are allowed to
/// stack; ids are strictly increasing for the life of the queue and
/// never reused, even after removals.
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Mutex<Vec<Toast>>,
    next_id: AtomicU64,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a toast and return its id.
    pub fn show(&self, text: impl Into<String>, mode: ToastMode) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            text: text.into(),
            mode,
        };
        self.toasts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(toast);
        id
    }

    /// Append an error toast and return its id.
    pub fn show_error(&self, text: impl Into<String>) -> u64 {
        self.show(text, ToastMode::Error)
    }

    /// Remove a toast by id. Removing an unknown id is a no-op.
    pub fn remove(&self, id: u64) {
        self.toasts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .retain(|t| t.id != id);
    }

    /// Current queue contents in display order.
    pub fn snapshot(&self) -> Vec<Toast> {
        self.toasts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.toasts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
