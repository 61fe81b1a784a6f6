//! The session provider's current-user value.

/// A read-only reference to the authenticated user.
///
/// Supplied by the session provider; the coordinator consumes it only to
/// populate optimistic `created_by` placeholder fields on entities created
/// before the server has responded. A signed-out session is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserRef {
    /// The user's stable identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
}

impl UserRef {
    /// Creates a user reference.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
