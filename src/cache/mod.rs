//! Keyed query-result cache.
//!
//! This module provides the client-side store that optimistic mutations
//! operate on:
//!
//! - [`QueryKey`]: structured, comparable cache identifier (resource name
//!   plus typed parameters)
//! - [`EntityCache`]: injectable keyed store with structural patch updates,
//!   staleness tracking, per-key versioning, and publish/subscribe
//! - [`CacheEvent`]: what subscribers observe (updates, invalidations,
//!   evictions)
//! - [`FetchToken`]: version snapshot used to discard stale fetch responses
//!
//! # Examples
//!
//! ```rust
//! use mutars::cache::{EntityCache, QueryKey};
//!
//! let cache: EntityCache<Vec<&str>> = EntityCache::new();
//! let key = QueryKey::new("tasks").with("project", 7).with("page", 0);
//!
//! cache.set(&key, vec!["pour foundation"]);
//! assert_eq!(cache.get(&key), Some(vec!["pour foundation"]));
//!
//! cache.patch(&key, |old| {
//!     old.map(|mut items| {
//!         items.push("erect scaffolding");
//!         items
//!     })
//! });
//! assert_eq!(cache.get(&key).unwrap().len(), 2);
//! ```

mod key;
mod store;

pub use key::{ParamValue, QueryKey};
pub use store::{CacheEvent, EntityCache, FetchToken, SubscriptionId};
