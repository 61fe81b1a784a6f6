//! The optimistic mutation lifecycle.
//!
//! [`MutationCoordinator::run_mutation`] wraps one remote mutation with
//! optimistic local effects and guaranteed eventual correctness:
//!
//! 1. Interrupt in-flight fetches for the key (best-effort cancellation).
//! 2. Snapshot the current cache value as the rollback target.
//! 3. Apply the optimistic patch synchronously, before any await.
//! 4. Dispatch the remote call.
//! 5. On failure: restore the snapshot, report through the [`Notifier`].
//! 6. On success: apply the reconcile patch, if one was supplied.
//! 7. On settle (always): invalidate the key — unconditionally, or on the
//!    pending counter's return to zero when the mutation is coalesced.
//!
//! Invalidation at settle is the single source of final truth; the
//! optimistic and reconcile patches are a latency-hiding optimization,
//! never the system of record. The displayed state is therefore eventually
//! consistent with the server even when the patches are wrong or omitted.
//!
//! Concurrent mutations against the same key are not serialized here: each
//! carries its own snapshot and counter pairing, and between concurrent
//! completions the last write wins (arrival order of the async
//! continuations). Callers needing strict ordering must queue.

use std::future::Future;
use std::sync::Arc;

use crate::cache::{EntityCache, QueryKey};
use crate::error::ValidationError;
use crate::remote::RemoteResult;

use super::notify::{Notification, Notifier};
use super::pending::PendingCounter;

type Patch<V> = Box<dyn FnOnce(Option<V>) -> Option<V> + Send>;
type Reconcile<V, T> = Box<dyn FnOnce(Option<V>, &T) -> Option<V> + Send>;
type Validate = Box<dyn FnOnce() -> Result<(), ValidationError> + Send>;

/// Orchestrates optimistic apply, rollback, reconciliation, and
/// settle-time invalidation over an injected [`EntityCache`].
///
/// Cheap to clone; clones share the cache and the notifier.
///
/// # Examples
///
/// ```rust,ignore
/// let coordinator = MutationCoordinator::new(cache, Arc::new(TracingNotifier));
/// coordinator
///     .mutation(QueryKey::new("tasks").with("project", 7))
///     .optimistic(|page| /* add the new task locally */ page)
///     .reconcile(|page, created| /* swap in the server id */ page)
///     .run(remote_service.create_task(input))
///     .await?;
/// ```
pub struct MutationCoordinator<V> {
    cache: Arc<EntityCache<V>>,
    notifier: Arc<dyn Notifier>,
}

impl<V> Clone for MutationCoordinator<V> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> MutationCoordinator<V> {
    /// Creates a coordinator over the given cache and notification sink.
    pub fn new(cache: Arc<EntityCache<V>>, notifier: Arc<dyn Notifier>) -> Self {
        Self { cache, notifier }
    }

    /// The cache this coordinator patches.
    #[must_use]
    pub fn cache(&self) -> &Arc<EntityCache<V>> {
        &self.cache
    }

    /// Starts building a mutation against `key`.
    #[must_use]
    pub fn mutation<T>(&self, key: QueryKey) -> MutationBuilder<'_, V, T> {
        MutationBuilder {
            coordinator: self,
            key,
            optimistic: None,
            reconcile: None,
            validate: None,
            coalesce: None,
        }
    }

    /// Runs the full lifecycle for one mutation.
    ///
    /// `optimistic` is applied to the cache before the remote call is
    /// awaited; `reconcile`, when supplied, merges the remote output back
    /// into the (possibly placeholder-bearing) optimistic value on success.
    ///
    /// Remote failures never propagate: the optimistic patch is rolled
    /// back to the pre-mutation snapshot and the failure is forwarded to
    /// the [`Notifier`]. A panicking `optimistic` closure aborts before
    /// dispatch with nothing applied, so no rollback is needed.
    pub async fn run_mutation<T, F>(
        &self,
        key: QueryKey,
        optimistic: impl FnOnce(Option<V>) -> Option<V> + Send + 'static,
        remote: F,
        reconcile: Option<Reconcile<V, T>>,
    ) where
        F: Future<Output = RemoteResult<T>>,
    {
        self.execute(key, Some(Box::new(optimistic)), remote, reconcile, None)
            .await;
    }

    async fn execute<T, F>(
        &self,
        key: QueryKey,
        optimistic: Option<Patch<V>>,
        remote: F,
        reconcile: Option<Reconcile<V, T>>,
        coalesce: Option<Arc<PendingCounter>>,
    ) where
        F: Future<Output = RemoteResult<T>>,
    {
        if let Some(counter) = &coalesce {
            counter.increment();
        }

        // Steps 1-3 run synchronously: the optimistic value is visible
        // before the first suspension point.
        self.cache.interrupt(&key);
        let snapshot = self.cache.get(&key);
        if let Some(patch) = optimistic {
            self.cache.patch(&key, patch);
            tracing::debug!(key = %key, "optimistic patch applied");
        }

        match remote.await {
            Ok(output) => {
                if let Some(merge) = reconcile {
                    self.cache.patch(&key, |current| merge(current, &output));
                    tracing::debug!(key = %key, "server result reconciled");
                }
            }
            Err(error) => {
                tracing::warn!(key = %key, %error, "remote call failed, rolling back");
                match snapshot {
                    Some(value) => self.cache.set(&key, value),
                    None => self.cache.evict(&key),
                }
                self.notifier.notify(Notification::MutationFailed {
                    key: key.clone(),
                    error,
                });
            }
        }

        // Settle: invalidation is the backstop regardless of outcome.
        match coalesce {
            Some(counter) => {
                if counter.decrement() {
                    tracing::debug!(key = %key, "pending operations drained, invalidating");
                    self.cache.invalidate(&key);
                }
            }
            None => self.cache.invalidate(&key),
        }
    }
}

/// Fluent construction of one mutation lifecycle.
///
/// Created by [`MutationCoordinator::mutation`]; consumed by
/// [`run`](Self::run).
pub struct MutationBuilder<'c, V, T> {
    coordinator: &'c MutationCoordinator<V>,
    key: QueryKey,
    optimistic: Option<Patch<V>>,
    reconcile: Option<Reconcile<V, T>>,
    validate: Option<Validate>,
    coalesce: Option<Arc<PendingCounter>>,
}

impl<'c, V: Clone + Send + Sync + 'static, T> MutationBuilder<'c, V, T> {
    /// Sets the optimistic patch applied before dispatch.
    #[must_use]
    pub fn optimistic(mut self, patch: impl FnOnce(Option<V>) -> Option<V> + Send + 'static) -> Self {
        self.optimistic = Some(Box::new(patch));
        self
    }

    /// Sets the patch that merges the server's output into the cache on
    /// success (replacing placeholder ids, recomputed derived fields).
    ///
    /// When omitted, the optimistic value stands until the settle-time
    /// invalidation refetches truth.
    #[must_use]
    pub fn reconcile(
        mut self,
        merge: impl FnOnce(Option<V>, &T) -> Option<V> + Send + 'static,
    ) -> Self {
        self.reconcile = Some(Box::new(merge));
        self
    }

    /// Adds a pre-dispatch validation check.
    ///
    /// A failing check rejects the mutation synchronously from
    /// [`run`](Self::run): no optimistic patch, no network call, no
    /// counter traffic.
    #[must_use]
    pub fn validate(
        mut self,
        check: impl FnOnce() -> Result<(), ValidationError> + Send + 'static,
    ) -> Self {
        self.validate = Some(Box::new(check));
        self
    }

    /// Coalesces this mutation's settle-time invalidation through the
    /// given counter (see [`PendingCounter`]).
    #[must_use]
    pub fn coalesce(mut self, counter: &Arc<PendingCounter>) -> Self {
        self.coalesce = Some(counter.clone());
        self
    }

    /// Runs the lifecycle.
    ///
    /// Returns `Err` only for pre-dispatch validation failures; remote
    /// failures settle internally (rollback plus notification) and yield
    /// `Ok(())`.
    ///
    /// # Errors
    ///
    /// The error produced by the [`validate`](Self::validate) check, if
    /// any; nothing has touched the cache or the network at that point.
    pub async fn run<F>(self, remote: F) -> Result<(), ValidationError>
    where
        F: Future<Output = RemoteResult<T>>,
    {
        if let Some(check) = self.validate {
            check()?;
        }
        self.coordinator
            .execute(self.key, self.optimistic, remote, self.reconcile, self.coalesce)
            .await;
        Ok(())
    }
}
