// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

type Cancel = Box<dyn FnOnce() + Send>;

/// Handle for a watch or bus registration.
///
/// Delivery stops as soon as `unsubscribe` returns: every delivery path
/// checks the shared active flag before invoking the callback. Dropping
/// the handle unsubscribes.
pub struct Subscription {
    active: Arc<AtomicBool>,
    cancel: Mutex<Option<Cancel>>,
}

impl Subscription {
    /// `active` must be the flag the delivery path checks.
    pub fn new<F>(active: Arc<AtomicBool>, on_cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            active,
            cancel: Mutex::new(Some(Box::new(on_cancel))),
        }
    }

    /// A subscription that never delivers anything.
    #[must_use]
    pub fn noop() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(false)),
            cancel: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Stop delivery and release resources. Calling it again does nothing.
    pub fn unsubscribe(&self) {
        self.active.store(false, Ordering::SeqCst);
        let cancel = self
            .cancel
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sub = Subscription::new(Arc::new(AtomicBool::new(true)), move || {
            let _ = counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(sub.is_active());
        sub.unsubscribe();
        sub.unsubscribe();
        drop(sub);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_noop_is_inactive() {
        let sub = Subscription::noop();
        assert!(!sub.is_active());
        sub.unsubscribe();
    }
}
