//! Injectable pub/sub used for toast notices and save-status broadcasts.
//!
//! Replaces global mutable listener registries with an explicit service owned
//! by whoever wires the session together: components subscribe with a
//! callback, receive a [`SubscriptionId`], and tear down with
//! [`Broadcaster::unsubscribe`]. Cloning a broadcaster clones the handle, not
//! the subscriber list, so one bus can be threaded through the store, the
//! interpreter, and the UI without cross-instance leakage.
//!
//! Single-threaded by design: callbacks run inline on `publish`.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use std::cell::RefCell;
use std::rc::Rc;

/// Handle returned by [`Broadcaster::subscribe`]; pass back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

struct Registry<T> {
    next_id: u64,
    subs: Vec<(u64, Rc<dyn Fn(&T)>)>,
}

/// A clonable single-threaded broadcast channel.
pub struct Broadcaster<T> {
    inner: Rc<RefCell<Registry<T>>>,
}

impl<T> Clone for Broadcaster<T> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<T> Default for Broadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Broadcaster<T> {
    /// Create a broadcaster with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry { next_id: 0, subs: Vec::new() })),
        }
    }

    /// Register a callback invoked on every subsequent publish.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> SubscriptionId {
        let mut reg = self.inner.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.subs.push((id, Rc::new(callback)));
        SubscriptionId(id)
    }

    /// Remove one subscription. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner.borrow_mut().subs.retain(|(sub_id, _)| *sub_id != id.0);
    }

    /// Drop every subscription at once (session teardown).
    pub fn clear(&self) {
        self.inner.borrow_mut().subs.clear();
    }

    /// Deliver `value` to every live subscriber, in subscription order.
    ///
    /// Delivery iterates a snapshot of the list, so callbacks may subscribe
    /// or unsubscribe on this same broadcaster; a subscription removed
    /// mid-publish can still receive the in-flight value.
    pub fn publish(&self, value: &T) {
        let snapshot: Vec<Rc<dyn Fn(&T)>> = self
            .inner
            .borrow()
            .subs
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in snapshot {
            callback(value);
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subs.len()
    }
}

/// Severity of a user-facing toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Neutral confirmation.
    Info,
    /// Partial success or degraded mode.
    Warn,
}

/// A user-facing toast message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Display severity.
    pub level: NoticeLevel,
    /// Toast body, already summarized (one notice per action kind per batch).
    pub message: String,
}

impl Notice {
    /// An informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    /// A warning notice.
    #[must_use]
    pub fn warn(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warn, message: message.into() }
    }
}
