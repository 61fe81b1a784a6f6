//! Domain entities carried through the cache.
//!
//! The three resource records this crate's lifecycle was built around,
//! plus the shared machinery they hang off:
//!
//! - [`EntityId`]: server-assigned id or client-generated placeholder
//! - [`Keyed`]: id access, so [`Page`] can offer the shared patch helpers
//! - [`Page`]: a paginated query result (items plus total count)
//! - [`Budget`] / [`Material`] / [`Task`]: the entity records
//! - [`UserRef`]: the session provider's read-only current-user value
//!
//! Entities validate their inputs at construction and keep derived fields
//! (like a budget's `difference`) consistent through every update, so an
//! optimistic patch can never cache a record the server would refuse to
//! derive.

mod budget;
mod id;
mod material;
mod page;
mod task;
mod user;

pub use budget::Budget;
pub use id::{EntityId, Keyed, PlaceholderIds};
pub use material::Material;
pub use page::Page;
pub use task::{Task, TaskStatus};
pub use user::UserRef;
