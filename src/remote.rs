//! The remote service contract.
//!
//! The coordinator treats the server as opaque: any future resolving to a
//! [`RemoteResult`] can be dispatched, and it must resolve exactly once.
//! No wire format is prescribed — HTTP, RPC, or an in-memory fake all
//! satisfy the contract, which is what keeps the mutation lifecycle
//! testable without a network.
//!
//! No timeout is imposed here; a mutation inherits whatever timeout (or
//! lack of one) its transport provides.

use thiserror::Error;

/// A remote mutation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The call never received a usable response (DNS, connect, reset,
    /// transport timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The server received the call and rejected it.
    #[error("rejected by server ({status}): {message}")]
    Rejected {
        /// Transport-level status code, when the transport has one.
        status: u16,
        /// Server-provided description of the rejection.
        message: String,
    },
}

/// What a remote mutation resolves to: the server's output on success
/// (the created entity, the updated record, or nothing for deletes), or a
/// [`RemoteError`].
pub type RemoteResult<T> = Result<T, RemoteError>;
