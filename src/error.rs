//! Pre-dispatch validation errors.
//!
//! Validation is the one error class that propagates synchronously to the
//! caller: it fires before any optimistic patch or network call, so the
//! form layer can surface it inline. Everything that happens after
//! dispatch goes through the [`Notifier`](crate::mutation::Notifier) side
//! channel instead.

use thiserror::Error;

use crate::entity::EntityId;

/// A mutation input rejected before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field was empty or blank.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A monetary or quantity field was negative.
    #[error("{field} must not be negative")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The mutation targeted an entity that only exists as an optimistic
    /// placeholder — the server has not confirmed it yet, so there is no
    /// authoritative id to mutate. Retry after the create settles.
    #[error("entity {id} has not been confirmed by the server yet")]
    UnconfirmedEntity {
        /// The placeholder id the mutation targeted.
        id: EntityId,
    },
}
