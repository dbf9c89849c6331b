use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};

use crate::sync::shutdown::{ShutdownSignal, Wake};

/// How `put` treats an occupied slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailboxPolicy {
    /// Wait for the consumer to empty the slot. Nothing is ever dropped.
    Blocking,
    /// Overwrite any unconsumed value. The producer is never delayed.
    LatestWins,
}

/// Outcome of a successful `put`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Stored,
    /// An unconsumed older value was dropped to make room.
    Replaced,
}

/// A value that could not be deposited, handed back to the producer.
#[derive(Debug, PartialEq, Eq)]
pub enum PutError<T> {
    /// The pipeline is shutting down.
    Shutdown(T),
    /// The consumer went away and will never take again.
    Abandoned(T),
    /// The producer already marked the mailbox finished.
    Finished(T),
}

impl<T> PutError<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Shutdown(v) | Self::Abandoned(v) | Self::Finished(v) => v,
        }
    }
}

/// Counters of one mailbox.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct MailboxStats {
    pub puts: u64,
    pub takes: u64,
    pub overwritten: u64,
}

struct Slot<T> {
    value: Option<T>,
    finished: bool,
    abandoned: bool,
}

/// Single-slot handoff cell between exactly one producer and one consumer.
///
/// Every wait re-checks the shared [`ShutdownSignal`], and the mailbox registers itself with
/// that signal on construction, so triggering shutdown releases any thread parked here.
pub struct Mailbox<T> {
    name: String,
    policy: MailboxPolicy,
    shutdown: ShutdownSignal,
    slot: Mutex<Slot<T>>,
    cond: Condvar,
    puts: AtomicU64,
    takes: AtomicU64,
    overwritten: AtomicU64,
}

impl<T: Send + 'static> Mailbox<T> {
    pub fn new(name: impl Into<String>, policy: MailboxPolicy, shutdown: &ShutdownSignal) -> Arc<Self> {
        let mailbox = Arc::new(Self {
            name: name.into(),
            policy,
            shutdown: shutdown.clone(),
            slot: Mutex::new(Slot {
                value: None,
                finished: false,
                abandoned: false,
            }),
            cond: Condvar::new(),
            puts: AtomicU64::new(0),
            takes: AtomicU64::new(0),
            overwritten: AtomicU64::new(0),
        });
        let weak: Weak<dyn Wake> = Arc::downgrade(&mailbox) as Weak<dyn Wake>;
        shutdown.register(weak);
        mailbox
    }
}

impl<T> Mailbox<T> {
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> MailboxPolicy {
        self.policy
    }

    /// Deposit `value`, waiting for the slot to empty under [`MailboxPolicy::Blocking`].
    pub fn put(&self, value: T) -> Result<Delivery, PutError<T>> {
        let mut slot = self.lock();
        loop {
            if self.shutdown.is_triggered() {
                return Err(PutError::Shutdown(value));
            }
            if slot.abandoned {
                return Err(PutError::Abandoned(value));
            }
            if slot.finished {
                return Err(PutError::Finished(value));
            }
            if self.policy == MailboxPolicy::LatestWins || slot.value.is_none() {
                break;
            }
            slot = self.cond.wait(slot).unwrap_or_else(PoisonError::into_inner);
        }

        let delivery = match slot.value.replace(value) {
            Some(_) => {
                self.overwritten.fetch_add(1, Ordering::Relaxed);
                Delivery::Replaced
            }
            None => Delivery::Stored,
        };
        self.puts.fetch_add(1, Ordering::Relaxed);
        self.cond.notify_all();
        Ok(delivery)
    }

    /// Take the current value without waiting.
    pub fn try_take(&self) -> Option<T> {
        let mut slot = self.lock();
        let value = slot.value.take()?;
        self.takes.fetch_add(1, Ordering::Relaxed);
        self.cond.notify_all();
        Some(value)
    }

    /// Wait for a value. Returns `None` on shutdown, or once the producer finished and the last
    /// value has been taken.
    pub fn take_blocking(&self) -> Option<T> {
        let mut slot = self.lock();
        loop {
            if self.shutdown.is_triggered() {
                return None;
            }
            if let Some(value) = slot.value.take() {
                self.takes.fetch_add(1, Ordering::Relaxed);
                self.cond.notify_all();
                return Some(value);
            }
            if slot.finished || slot.abandoned {
                return None;
            }
            slot = self.cond.wait(slot).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Producer side: no more values will follow. A pending value stays takeable.
    pub fn finish(&self) {
        let mut slot = self.lock();
        slot.finished = true;
        self.cond.notify_all();
    }

    /// Consumer side: stop accepting values and drop anything pending.
    pub fn abandon(&self) {
        let pending = {
            let mut slot = self.lock();
            slot.abandoned = true;
            self.cond.notify_all();
            slot.value.take()
        };
        drop(pending);
    }

    pub fn is_finished(&self) -> bool {
        self.lock().finished
    }

    pub fn is_abandoned(&self) -> bool {
        self.lock().abandoned
    }

    /// Finished with nothing left to take: no further value can ever arrive.
    pub fn is_drained(&self) -> bool {
        let slot = self.lock();
        slot.finished && slot.value.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().value.is_none()
    }

    pub fn stats(&self) -> MailboxStats {
        MailboxStats {
            puts: self.puts.load(Ordering::Relaxed),
            takes: self.takes.load(Ordering::Relaxed),
            overwritten: self.overwritten.load(Ordering::Relaxed),
        }
    }
}

impl<T: Send> Wake for Mailbox<T> {
    fn wake_all(&self) {
        let _slot = self.lock();
        self.cond.notify_all();
    }
}

impl<T> std::fmt::Debug for Mailbox<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailbox")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/mailbox.rs"]
mod tests;
