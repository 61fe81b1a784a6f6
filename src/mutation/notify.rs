//! Fire-and-forget notification side channel.
//!
//! Remote failures never propagate out of
//! [`run_mutation`](crate::mutation::MutationCoordinator::run_mutation):
//! the coordinator rolls back, settles, and reports the failure here
//! instead, matching the fire-and-forget mutation style of the UI layers
//! this crate serves. A toast component subscribes to (or polls) the
//! notifier; the mutation caller does not handle the error inline.

use parking_lot::Mutex;

use crate::cache::QueryKey;
use crate::remote::RemoteError;

/// A user-facing notification emitted by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A remote mutation failed; the optimistic patch was rolled back.
    MutationFailed {
        /// The cache key the mutation targeted.
        key: QueryKey,
        /// The remote failure, verbatim.
        error: RemoteError,
    },
}

/// Sink for coordinator notifications.
///
/// Implementations must be cheap and non-blocking; they are called on the
/// mutation's own task right after rollback.
pub trait Notifier: Send + Sync {
    /// Delivers one notification.
    fn notify(&self, notification: Notification);
}

/// A [`Notifier`] that forwards failures to `tracing` at warn level.
///
/// The default choice when no UI surface consumes notifications directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::MutationFailed { key, error } => {
                tracing::warn!(key = %key, %error, "mutation failed");
            }
        }
    }
}

/// A [`Notifier`] that records notifications in memory.
///
/// Suited to polling UIs and to tests asserting that a failure was
/// surfaced.
#[derive(Debug, Default)]
pub struct BufferNotifier {
    buffer: Mutex<Vec<Notification>>,
}

impl BufferNotifier {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns all buffered notifications, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.buffer.lock())
    }

    /// Clones the buffered notifications without removing them.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Notification> {
        self.buffer.lock().clone()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }
}

impl Notifier for BufferNotifier {
    fn notify(&self, notification: Notification) {
        self.buffer.lock().push(notification);
    }
}
