use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Anything parked on a condition variable that must be released when shutdown fires.
pub trait Wake: Send + Sync {
    /// Take the waiter's lock and notify every thread parked on it.
    fn wake_all(&self);
}

/// Pipeline-wide cooperative cancellation flag.
///
/// Cloning is cheap; every clone observes the same flag. [`ShutdownSignal::trigger`] sets the
/// flag first and only then wakes registered waiters while holding their lock, so a waiter that
/// checked the flag before parking cannot miss the notification.
#[derive(Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    triggered: AtomicBool,
    waiters: Mutex<Vec<Weak<dyn Wake>>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::Acquire)
    }

    /// Set the flag and wake every live registered waiter. Idempotent.
    pub fn trigger(&self) {
        if self.inner.triggered.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::debug!("shutdown triggered");
        let waiters = {
            let mut guard = self
                .inner
                .waiters
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            guard.retain(|w| w.strong_count() > 0);
            guard.clone()
        };
        for waiter in waiters.iter().filter_map(Weak::upgrade) {
            waiter.wake_all();
        }
    }

    /// Register a waiter. Registration after the trigger wakes it immediately.
    pub fn register(&self, waiter: Weak<dyn Wake>) {
        {
            let mut guard = self
                .inner
                .waiters
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            guard.retain(|w| w.strong_count() > 0);
            guard.push(waiter.clone());
        }
        if self.is_triggered()
            && let Some(w) = waiter.upgrade()
        {
            w.wake_all();
        }
    }

    /// Number of live registered waiters.
    pub fn waiter_count(&self) -> usize {
        self.inner
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

impl std::fmt::Debug for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownSignal")
            .field("triggered", &self.is_triggered())
            .finish()
    }
}
