//! # tasksync-storage
//!
//! Read-only access to the relational source of truth.
//!
//! Two queries are needed: the bulk join used by the initial reindex, and
//! a point lookup of a user's display name used to enrich change events.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::StorageError;
pub use memory::MemoryTaskStore;
pub use postgres::PgTaskStore;
pub use store::TaskStore;
