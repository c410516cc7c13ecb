//! Append-only event store boundary.
//!
//! The movement ledger lives here: one stream per aggregate, monotonic
//! sequence numbers, optimistic concurrency on append. No storage
//! assumptions leak upward; the in-memory backend and the Postgres backend
//! are interchangeable behind the `EventStore` trait.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryEventStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresEventStore;
pub use r#trait::{EventStore, EventStoreError, StoredEvent, UncommittedEvent};
