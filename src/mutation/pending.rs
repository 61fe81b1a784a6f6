//! Reference-counted invalidation barrier.
//!
//! N overlapping delete operations on the same collection must not each
//! trigger an independent invalidate/refetch: that costs N round trips and
//! a refetch landing mid-flight can resurrect an optimistically removed
//! row. [`PendingCounter`] defers invalidation until the whole batch has
//! settled.
//!
//! # Protocol
//!
//! - On mutation start: [`increment`](PendingCounter::increment).
//! - On mutation settle (success or failure, after rollback or
//!   reconciliation): [`decrement`](PendingCounter::decrement).
//! - Invalidate the collection only when `decrement` reports the
//!   transition back to zero.
//!
//! Conceptually the counter has two states: **quiescent** (zero, safe to
//! invalidate) and **draining** (non-zero, invalidation deferred). There is
//! no timeout: a remote call that never settles leaves the collection
//! unrefreshed, an accepted liveness risk.
//!
//! # Invariants
//!
//! - The counter is never negative; decrements pair 1:1 with increments
//!   from the same mutation lifecycle.
//! - `decrement` returns `true` exactly once per return-to-zero
//!   transition, never once per decrement.

use std::sync::atomic::{AtomicUsize, Ordering};

/// A per-collection pending-operation counter.
///
/// Shared between the mutations of one logical collection via `Arc` and
/// handed to [`MutationBuilder::coalesce`](crate::mutation::MutationBuilder::coalesce).
///
/// # Examples
///
/// ```rust
/// use mutars::mutation::PendingCounter;
///
/// let counter = PendingCounter::new();
/// counter.increment();
/// counter.increment();
/// assert!(!counter.decrement()); // still draining
/// assert!(counter.decrement());  // quiescent: invalidate now
/// assert!(counter.is_zero());
/// ```
#[derive(Debug, Default)]
pub struct PendingCounter {
    pending: AtomicUsize,
}

impl PendingCounter {
    /// Creates a quiescent counter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: AtomicUsize::new(0),
        }
    }

    /// Records the start of one mutation lifecycle.
    pub fn increment(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    /// Records the settle of one mutation lifecycle.
    ///
    /// Returns `true` iff this call made the counter quiescent (the 1→0
    /// transition) — the only moment at which the collection should be
    /// invalidated.
    ///
    /// An unmatched decrement saturates at zero and returns `false`; in
    /// debug builds it also trips an assertion, since decrements must pair
    /// 1:1 with increments.
    pub fn decrement(&self) -> bool {
        let result = self
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |pending| {
                pending.checked_sub(1)
            });
        match result {
            Ok(previous) => previous == 1,
            Err(_) => {
                tracing::warn!("pending counter decremented without a matching increment");
                debug_assert!(false, "unmatched PendingCounter::decrement");
                false
            }
        }
    }

    /// Returns `true` if the counter is quiescent (no mutation in flight).
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.pending.load(Ordering::SeqCst) == 0
    }

    /// Number of mutations currently draining.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn new_counter_is_quiescent() {
        let counter = PendingCounter::new();
        assert!(counter.is_zero());
        assert_eq!(counter.pending(), 0);
    }

    #[rstest]
    fn increment_moves_to_draining() {
        let counter = PendingCounter::new();
        counter.increment();
        assert!(!counter.is_zero());
        assert_eq!(counter.pending(), 1);
    }

    #[rstest]
    fn decrement_reports_only_the_zero_transition() {
        let counter = PendingCounter::new();
        counter.increment();
        counter.increment();
        counter.increment();

        assert!(!counter.decrement());
        assert!(!counter.decrement());
        assert!(counter.decrement());
        assert!(counter.is_zero());
    }

    #[rstest]
    fn interleaved_increments_defer_the_zero_transition() {
        let counter = PendingCounter::new();
        counter.increment(); // 1
        counter.increment(); // 2
        assert!(!counter.decrement()); // 1
        counter.increment(); // 2
        assert!(!counter.decrement()); // 1
        assert!(counter.decrement()); // 0
    }

    #[rstest]
    #[cfg(not(debug_assertions))]
    fn unmatched_decrement_saturates_at_zero() {
        let counter = PendingCounter::new();
        assert!(!counter.decrement());
        assert!(counter.is_zero());
    }
}
