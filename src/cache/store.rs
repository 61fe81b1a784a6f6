//! The keyed entity cache.
//!
//! [`EntityCache`] stores the last known result payload for each
//! [`QueryKey`] and supports the three update paths an optimistic mutation
//! lifecycle needs: unconditional `set`, structural `patch` (a function
//! from the old value, or absence, to the new value), and `invalidate`
//! (mark stale so a collaborator refetches in the background).
//!
//! # Design
//!
//! - The cache is an explicit, injectable object shared via `Arc` — there
//!   is no ambient singleton, which keeps coordinators unit-testable
//!   without a rendering framework.
//! - Every entry carries a monotonic version drawn from a cache-wide
//!   counter. Fetches snapshot the version through [`FetchToken`] and are
//!   discarded on completion if anything wrote to the key in between.
//!   This closes the stale-response race that best-effort fetch
//!   cancellation leaves open.
//! - Observation is an explicit publish/subscribe surface
//!   ([`EntityCache::subscribe`]) rather than an implicit re-render hook.
//!
//! # Invariants
//!
//! - All reads and writes are synchronous critical sections; no lock is
//!   held across an await point.
//! - Invalidation is idempotent: an already-stale entry is not re-notified,
//!   so repeated invalidation cannot cascade into repeated refetches.
//! - Versions strictly increase per write, across eviction and
//!   re-creation of an entry.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

use super::key::QueryKey;

/// What subscribers observe when a cache entry changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent<V> {
    /// The entry was replaced with a fresh value (by `set`, `patch`, or a
    /// completed fetch).
    Updated {
        /// The value now stored under the key.
        value: V,
    },
    /// The entry was marked stale; a background refetch should be issued.
    Invalidated,
    /// The entry was removed entirely.
    Evicted,
}

/// Identifies one subscription, for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A version snapshot taken when a fetch is dispatched.
///
/// Pass it back to [`EntityCache::complete_fetch`] with the fetched value;
/// the store is skipped if any write touched the key in the meantime.
#[derive(Debug, Clone)]
pub struct FetchToken {
    key: QueryKey,
    version: u64,
}

impl FetchToken {
    /// The key this fetch was issued for.
    #[must_use]
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

struct Entry<V> {
    value: Option<V>,
    version: u64,
    stale: bool,
}

type Listener<V> = Arc<dyn Fn(&CacheEvent<V>) + Send + Sync>;

struct Subscriber<V> {
    id: u64,
    key: QueryKey,
    listener: Listener<V>,
}

/// An in-memory keyed store of query results.
///
/// `V` is the result payload for one query — typically a
/// [`Page`](crate::entity::Page) of entities. Values are cloned out on
/// read, so `V` should be cheap to clone or internally shared.
///
/// # Reentrancy
///
/// The updater passed to [`patch`](Self::patch) runs while the store lock
/// is held and must not call back into the cache. Subscribed listeners are
/// invoked after all locks are released and may reenter freely.
pub struct EntityCache<V> {
    entries: RwLock<HashMap<QueryKey, Entry<V>>>,
    subscribers: Mutex<Vec<Subscriber<V>>>,
    next_version: AtomicU64,
    next_subscription: AtomicU64,
}

impl<V: Clone> EntityCache<V> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            subscribers: Mutex::new(Vec::new()),
            next_version: AtomicU64::new(1),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Returns a clone of the current value for `key`, if any.
    ///
    /// Stale entries are still returned: the UI keeps showing the last
    /// known data while a refetch is in flight.
    #[must_use]
    pub fn get(&self, key: &QueryKey) -> Option<V> {
        self.entries
            .read()
            .get(key)
            .and_then(|entry| entry.value.clone())
    }

    /// Returns `true` if the entry for `key` is marked stale.
    #[must_use]
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries
            .read()
            .get(key)
            .is_some_and(|entry| entry.stale)
    }

    /// Number of cached entries that currently hold a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .values()
            .filter(|entry| entry.value.is_some())
            .count()
    }

    /// Returns `true` if no entry currently holds a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the value for `key` unconditionally.
    ///
    /// Clears staleness, bumps the version (discarding any in-flight
    /// fetches), and notifies subscribers with [`CacheEvent::Updated`].
    pub fn set(&self, key: &QueryKey, value: V) {
        {
            let mut entries = self.entries.write();
            let entry = Self::entry_mut(&mut entries, key);
            entry.value = Some(value.clone());
            entry.stale = false;
            entry.version = self.bump_version();
        }
        tracing::debug!(key = %key, "cache entry set");
        self.notify(key, &CacheEvent::Updated { value });
    }

    /// Computes a new value from the old one (or absence) and stores it.
    ///
    /// The updater returning `None` leaves the cache untouched: update and
    /// delete patches pass absent caches through unchanged, while create
    /// patches synthesize a singleton result instead.
    ///
    /// The updater runs under the store lock and must not reenter the
    /// cache.
    pub fn patch(&self, key: &QueryKey, updater: impl FnOnce(Option<V>) -> Option<V>) {
        let updated = {
            let mut entries = self.entries.write();
            let current = entries.get(key).and_then(|entry| entry.value.clone());
            match updater(current) {
                Some(value) => {
                    let entry = Self::entry_mut(&mut entries, key);
                    entry.value = Some(value.clone());
                    entry.stale = false;
                    entry.version = self.bump_version();
                    Some(value)
                }
                None => None,
            }
        };
        if let Some(value) = updated {
            tracing::debug!(key = %key, "cache entry patched");
            self.notify(key, &CacheEvent::Updated { value });
        }
    }

    /// Marks the entry for `key` stale and notifies subscribers so a
    /// background refetch can be issued. Never blocks on that refetch.
    ///
    /// Idempotent: an entry that is already stale (or holds no value) is
    /// left alone and subscribers are not re-notified.
    pub fn invalidate(&self, key: &QueryKey) {
        let marked = {
            let mut entries = self.entries.write();
            match entries.get_mut(key) {
                Some(entry) if entry.value.is_some() && !entry.stale => {
                    entry.stale = true;
                    entry.version = self.bump_version();
                    true
                }
                _ => false,
            }
        };
        if marked {
            tracing::debug!(key = %key, "cache entry invalidated");
            self.notify(key, &CacheEvent::Invalidated);
        }
    }

    /// Marks every entry whose key matches `predicate` stale.
    ///
    /// Used to invalidate a whole resource at once, e.g.
    /// `cache.invalidate_where(|key| key.is_for("tasks"))`.
    pub fn invalidate_where(&self, predicate: impl Fn(&QueryKey) -> bool) {
        let marked: Vec<QueryKey> = {
            let mut entries = self.entries.write();
            let mut keys = Vec::new();
            for (key, entry) in entries.iter_mut() {
                if entry.value.is_some() && !entry.stale && predicate(key) {
                    entry.stale = true;
                    entry.version = self.bump_version();
                    keys.push(key.clone());
                }
            }
            keys
        };
        for key in marked {
            tracing::debug!(key = %key, "cache entry invalidated");
            self.notify(&key, &CacheEvent::Invalidated);
        }
    }

    /// Removes the entry for `key` entirely.
    ///
    /// Used by the coordinator to roll a failed create back to "nothing
    /// cached". Subscribers observe [`CacheEvent::Evicted`].
    pub fn evict(&self, key: &QueryKey) {
        let removed = {
            let mut entries = self.entries.write();
            entries
                .remove(key)
                .is_some_and(|entry| entry.value.is_some())
        };
        if removed {
            tracing::debug!(key = %key, "cache entry evicted");
            self.notify(key, &CacheEvent::Evicted);
        }
    }

    /// Advisory cancellation of in-flight fetches for `key`.
    ///
    /// Bumps the entry version without changing the value, so any fetch
    /// dispatched earlier is discarded when it completes. The transport is
    /// not contacted; a response that cannot be suppressed at the source is
    /// simply dropped on arrival.
    pub fn interrupt(&self, key: &QueryKey) {
        let mut entries = self.entries.write();
        let entry = Self::entry_mut(&mut entries, key);
        entry.version = self.bump_version();
    }

    /// Snapshots the key's version before dispatching a fetch.
    #[must_use]
    pub fn begin_fetch(&self, key: &QueryKey) -> FetchToken {
        let version = self
            .entries
            .read()
            .get(key)
            .map_or(0, |entry| entry.version);
        FetchToken {
            key: key.clone(),
            version,
        }
    }

    /// Stores a fetched value unless the key changed since
    /// [`begin_fetch`](Self::begin_fetch).
    ///
    /// Returns `true` if the value was stored, `false` if it was discarded
    /// because a `set`, `patch`, `invalidate`, `evict`, or `interrupt`
    /// intervened. A discarded response is a stale response: the cache
    /// already holds (or is about to hold) something newer.
    pub fn complete_fetch(&self, token: &FetchToken, value: V) -> bool {
        let stored = {
            let mut entries = self.entries.write();
            let current = entries
                .get(&token.key)
                .map_or(0, |entry| entry.version);
            if current == token.version {
                let entry = Self::entry_mut(&mut entries, &token.key);
                entry.value = Some(value.clone());
                entry.stale = false;
                entry.version = self.bump_version();
                true
            } else {
                false
            }
        };
        if stored {
            self.notify(&token.key, &CacheEvent::Updated { value });
        } else {
            tracing::debug!(key = %token.key, "stale fetch response discarded");
        }
        stored
    }

    /// Registers a listener for changes to `key`.
    ///
    /// Listeners are invoked after all cache locks are released and may
    /// reenter the cache (e.g. to issue a refetch and `complete_fetch` it).
    pub fn subscribe(
        &self,
        key: &QueryKey,
        listener: impl Fn(&CacheEvent<V>) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().push(Subscriber {
            id,
            key: key.clone(),
            listener: Arc::new(listener),
        });
        SubscriptionId(id)
    }

    /// Removes a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|subscriber| subscriber.id != id.0);
        subscribers.len() != before
    }

    fn entry_mut<'m>(
        entries: &'m mut HashMap<QueryKey, Entry<V>>,
        key: &QueryKey,
    ) -> &'m mut Entry<V> {
        entries.entry(key.clone()).or_insert_with(|| Entry {
            value: None,
            version: 0,
            stale: false,
        })
    }

    fn bump_version(&self) -> u64 {
        self.next_version.fetch_add(1, Ordering::Relaxed)
    }

    fn notify(&self, key: &QueryKey, event: &CacheEvent<V>) {
        let listeners: Vec<Listener<V>> = self
            .subscribers
            .lock()
            .iter()
            .filter(|subscriber| subscriber.key == *key)
            .map(|subscriber| subscriber.listener.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

impl<V: Clone> Default for EntityCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use rstest::rstest;

    fn key() -> QueryKey {
        QueryKey::new("budgets").with("project", 7)
    }

    // =========================================================================
    // get / set / patch
    // =========================================================================

    #[rstest]
    fn get_on_empty_cache_returns_none() {
        let cache: EntityCache<i32> = EntityCache::new();
        assert_eq!(cache.get(&key()), None);
        assert!(cache.is_empty());
    }

    #[rstest]
    fn set_then_get_round_trips() {
        let cache = EntityCache::new();
        cache.set(&key(), vec![1, 2]);
        assert_eq!(cache.get(&key()), Some(vec![1, 2]));
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    fn set_clears_staleness() {
        let cache = EntityCache::new();
        cache.set(&key(), 1);
        cache.invalidate(&key());
        assert!(cache.is_stale(&key()));

        cache.set(&key(), 2);
        assert!(!cache.is_stale(&key()));
    }

    #[rstest]
    fn patch_on_absent_entry_can_synthesize_a_value() {
        let cache = EntityCache::new();
        cache.patch(&key(), |old| {
            assert!(old.is_none());
            Some(vec![42])
        });
        assert_eq!(cache.get(&key()), Some(vec![42]));
    }

    #[rstest]
    fn patch_returning_none_leaves_cache_untouched() {
        let cache: EntityCache<Vec<i32>> = EntityCache::new();
        cache.patch(&key(), |old: Option<Vec<i32>>| old);
        assert_eq!(cache.get(&key()), None);
        assert!(cache.is_empty());
    }

    #[rstest]
    fn patch_transforms_existing_value() {
        let cache = EntityCache::new();
        cache.set(&key(), vec![1]);
        cache.patch(&key(), |old| {
            old.map(|mut items| {
                items.push(2);
                items
            })
        });
        assert_eq!(cache.get(&key()), Some(vec![1, 2]));
    }

    #[rstest]
    fn evict_removes_the_entry() {
        let cache = EntityCache::new();
        cache.set(&key(), 1);
        cache.evict(&key());
        assert_eq!(cache.get(&key()), None);
        assert!(cache.is_empty());
    }

    // =========================================================================
    // Invalidation
    // =========================================================================

    #[rstest]
    fn invalidate_marks_entry_stale_but_keeps_value_readable() {
        let cache = EntityCache::new();
        cache.set(&key(), 9);
        cache.invalidate(&key());
        assert!(cache.is_stale(&key()));
        assert_eq!(cache.get(&key()), Some(9));
    }

    #[rstest]
    fn invalidate_is_idempotent() {
        let cache = EntityCache::new();
        cache.set(&key(), 1);

        let notifications = Arc::new(AtomicUsize::new(0));
        let seen = notifications.clone();
        cache.subscribe(&key(), move |event| {
            if matches!(event, CacheEvent::Invalidated) {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        cache.invalidate(&key());
        cache.invalidate(&key());
        cache.invalidate(&key());
        assert_eq!(notifications.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn invalidate_on_absent_entry_is_a_no_op() {
        let cache: EntityCache<i32> = EntityCache::new();
        cache.invalidate(&key());
        assert!(!cache.is_stale(&key()));
    }

    #[rstest]
    fn invalidate_where_marks_only_matching_resources() {
        let cache = EntityCache::new();
        let budgets = QueryKey::new("budgets").with("project", 7);
        let tasks = QueryKey::new("tasks").with("project", 7);
        cache.set(&budgets, 1);
        cache.set(&tasks, 2);

        cache.invalidate_where(|key| key.is_for("budgets"));
        assert!(cache.is_stale(&budgets));
        assert!(!cache.is_stale(&tasks));
    }

    // =========================================================================
    // Fetch versioning
    // =========================================================================

    #[rstest]
    fn completed_fetch_stores_when_nothing_intervened() {
        let cache = EntityCache::new();
        let token = cache.begin_fetch(&key());
        assert!(cache.complete_fetch(&token, 5));
        assert_eq!(cache.get(&key()), Some(5));
        assert!(!cache.is_stale(&key()));
    }

    #[rstest]
    fn fetch_is_discarded_after_an_intervening_patch() {
        let cache = EntityCache::new();
        cache.set(&key(), 1);

        let token = cache.begin_fetch(&key());
        cache.patch(&key(), |_| Some(99));

        assert!(!cache.complete_fetch(&token, 2));
        assert_eq!(cache.get(&key()), Some(99));
    }

    #[rstest]
    fn fetch_is_discarded_after_interrupt() {
        let cache = EntityCache::new();
        cache.set(&key(), 1);

        let token = cache.begin_fetch(&key());
        cache.interrupt(&key());

        assert!(!cache.complete_fetch(&token, 2));
        assert_eq!(cache.get(&key()), Some(1));
    }

    #[rstest]
    fn second_of_two_overlapping_fetches_is_discarded() {
        let cache = EntityCache::new();
        let first = cache.begin_fetch(&key());
        let second = cache.begin_fetch(&key());

        assert!(cache.complete_fetch(&first, 10));
        assert!(!cache.complete_fetch(&second, 20));
        assert_eq!(cache.get(&key()), Some(10));
    }

    #[rstest]
    fn fetch_is_discarded_after_evict() {
        let cache = EntityCache::new();
        cache.set(&key(), 1);
        let token = cache.begin_fetch(&key());
        cache.evict(&key());

        assert!(!cache.complete_fetch(&token, 2));
        assert_eq!(cache.get(&key()), None);
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    #[rstest]
    fn subscribers_observe_updates_for_their_key_only() {
        let cache = EntityCache::new();
        let other = QueryKey::new("tasks");

        let observed = Arc::new(Mutex::new(Vec::new()));
        let sink = observed.clone();
        cache.subscribe(&key(), move |event| {
            sink.lock().push(event.clone());
        });

        cache.set(&key(), 1);
        cache.set(&other, 2);

        let events = observed.lock();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], CacheEvent::Updated { value: 1 });
    }

    #[rstest]
    fn unsubscribe_stops_notifications() {
        let cache = EntityCache::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let id = cache.subscribe(&key(), move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        cache.set(&key(), 1);
        assert!(cache.unsubscribe(id));
        assert!(!cache.unsubscribe(id));
        cache.set(&key(), 2);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn evict_notifies_subscribers() {
        let cache = EntityCache::new();
        cache.set(&key(), 1);

        let observed = Arc::new(Mutex::new(Vec::new()));
        let sink = observed.clone();
        cache.subscribe(&key(), move |event: &CacheEvent<i32>| {
            sink.lock().push(event.clone());
        });

        cache.evict(&key());
        assert_eq!(*observed.lock(), vec![CacheEvent::Evicted]);
    }
}
