//! # mutars
//!
//! An optimistic mutation coordination library providing keyed entity
//! caches, rollback-safe mutation lifecycles, and coalesced invalidation.
//!
//! ## Overview
//!
//! UI layers that talk to a remote service over a slow link hide mutation
//! latency by patching a local cache *before* the server confirms the
//! change. Doing that safely requires a small amount of real bookkeeping:
//! rollback snapshots, success reconciliation, and settle-time invalidation
//! that refetches authoritative data no matter what the local patches did.
//! This crate packages that bookkeeping as three cooperating pieces:
//!
//! - **[`EntityCache`]**: an injectable keyed store of query results with
//!   structural patch updates, staleness tracking, per-key version counters,
//!   and an explicit publish/subscribe surface.
//! - **[`MutationCoordinator`]**: wraps a remote mutation with the full
//!   optimistic lifecycle — interrupt in-flight fetches, snapshot, apply the
//!   optimistic patch, dispatch, roll back or reconcile, and invalidate on
//!   settle.
//! - **[`PendingCounter`]**: a reference-counted barrier that defers
//!   invalidation while overlapping deletes against the same collection are
//!   still draining, so the collection is refetched once, not N times.
//!
//! The remote service itself is opaque to this crate: any future resolving
//! to a [`RemoteResult`] will do, and no wire format is prescribed.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mutars::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let cache: Arc<EntityCache<Page<Task>>> = Arc::new(EntityCache::new());
//!     let coordinator = MutationCoordinator::new(cache.clone(), Arc::new(TracingNotifier));
//!
//!     let key = QueryKey::new("tasks").with("project", 7);
//!     coordinator
//!         .mutation(key)
//!         .optimistic(|page: Option<Page<Task>>| page.map(|mut p| { p.total += 1; p }))
//!         .run(async { Ok(()) })
//!         .await
//!         .expect("validation");
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: `Serialize`/`Deserialize` derives on keys, entities, and pages.
//!
//! [`EntityCache`]: cache::EntityCache
//! [`MutationCoordinator`]: mutation::MutationCoordinator
//! [`PendingCounter`]: mutation::PendingCounter
//! [`RemoteResult`]: remote::RemoteResult

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use mutars::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cache::{CacheEvent, EntityCache, FetchToken, ParamValue, QueryKey};
    pub use crate::entity::{
        Budget, EntityId, Keyed, Material, Page, PlaceholderIds, Task, TaskStatus, UserRef,
    };
    pub use crate::error::ValidationError;
    pub use crate::mutation::{
        BufferNotifier, MutationCoordinator, Notification, Notifier, PendingCounter,
        TracingNotifier,
    };
    pub use crate::remote::{RemoteError, RemoteResult};
}

pub mod cache;
pub mod entity;
pub mod error;
pub mod mutation;
pub mod remote;
