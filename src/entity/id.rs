//! Entity identifiers: server-assigned or optimistic placeholder.
//!
//! Entities created optimistically need an identity before the server has
//! assigned one, so the cache can address them in follow-up patches. A
//! [`EntityId::Placeholder`] fills that gap and is never semantically
//! trusted as final: mutations that require an authoritative id go through
//! [`EntityId::require_server`], which rejects placeholders synchronously.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ValidationError;

/// A stable entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntityId {
    /// Client-generated, assigned to an optimistically created entity
    /// before the server responds. Valid only as a local cache address.
    Placeholder(u64),
    /// Assigned by the server; the authoritative identity.
    Server(i64),
}

impl EntityId {
    /// Returns `true` for client-generated placeholder ids.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// Returns the server-assigned id, or rejects the mutation.
    ///
    /// This is the single enforcement point for the placeholder policy:
    /// update and delete mutations against an entity the server has not
    /// confirmed yet fail validation instead of dispatching.
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnconfirmedEntity`] when the id is a
    /// placeholder.
    pub const fn require_server(&self) -> Result<i64, ValidationError> {
        match self {
            Self::Server(id) => Ok(*id),
            Self::Placeholder(_) => Err(ValidationError::UnconfirmedEntity { id: *self }),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placeholder(n) => write!(formatter, "tmp-{n}"),
            Self::Server(n) => write!(formatter, "{n}"),
        }
    }
}

/// Monotonic source of placeholder ids.
///
/// One per client session is enough; ids only need to be unique among
/// unconfirmed entities in the local cache.
#[derive(Debug, Default)]
pub struct PlaceholderIds {
    next: AtomicU64,
}

impl PlaceholderIds {
    /// Creates a source starting at `tmp-1`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Draws the next placeholder id.
    pub fn next(&self) -> EntityId {
        EntityId::Placeholder(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Access to an entity's identifier.
///
/// Implemented by every cached entity; lets [`Page`](crate::entity::Page)
/// offer the shared optimistic patch helpers (`upsert`, `remove`,
/// `replace_id`) without knowing the concrete record type.
pub trait Keyed {
    /// The entity's current identifier.
    fn id(&self) -> &EntityId;

    /// Mutable access, used to swap a placeholder for the server id
    /// during success reconciliation.
    fn id_mut(&mut self) -> &mut EntityId;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn placeholder_ids_are_unique_and_increasing() {
        let ids = PlaceholderIds::new();
        assert_eq!(ids.next(), EntityId::Placeholder(1));
        assert_eq!(ids.next(), EntityId::Placeholder(2));
        assert_eq!(ids.next(), EntityId::Placeholder(3));
    }

    #[rstest]
    fn require_server_accepts_server_ids() {
        assert_eq!(EntityId::Server(41).require_server(), Ok(41));
    }

    #[rstest]
    fn require_server_rejects_placeholders() {
        let id = EntityId::Placeholder(9);
        assert!(id.is_placeholder());
        assert_eq!(
            id.require_server(),
            Err(ValidationError::UnconfirmedEntity { id })
        );
    }

    #[rstest]
    fn display_distinguishes_placeholders() {
        assert_eq!(EntityId::Placeholder(2).to_string(), "tmp-2");
        assert_eq!(EntityId::Server(2).to_string(), "2");
    }
}
