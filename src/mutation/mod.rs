//! Optimistic mutation lifecycle coordination.
//!
//! This module wraps remote mutations (create/update/delete) with
//! optimistic local effects and guaranteed eventual correctness:
//!
//! - [`MutationCoordinator`]: runs the lifecycle — interrupt in-flight
//!   fetches, snapshot, optimistic patch, dispatch, rollback or reconcile,
//!   settle-time invalidation
//! - [`PendingCounter`]: reference-counted barrier coalescing the
//!   invalidation of overlapping deletes on one collection
//! - [`Notifier`]: fire-and-forget side channel for surfacing remote
//!   failures to the user without threading them through return values
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mutars::cache::{EntityCache, QueryKey};
//! use mutars::mutation::{MutationCoordinator, TracingNotifier};
//!
//! # #[tokio::main] async fn main() {
//! let cache = Arc::new(EntityCache::new());
//! let coordinator = MutationCoordinator::new(cache, Arc::new(TracingNotifier));
//!
//! coordinator
//!     .mutation(QueryKey::new("materials").with("diary", 3))
//!     .optimistic(|old: Option<Vec<u32>>| old.map(|mut amounts| {
//!         amounts.push(5);
//!         amounts
//!     }))
//!     .run(async { Ok(()) })
//!     .await
//!     .unwrap();
//! # }
//! ```

mod coordinator;
mod notify;
mod pending;

pub use coordinator::{MutationBuilder, MutationCoordinator};
pub use notify::{BufferNotifier, Notification, Notifier, TracingNotifier};
pub use pending::PendingCounter;
