//! Infrastructure: event store, command dispatch, read models and
//! projections backing the movement ledger.

pub mod command_dispatcher;
pub mod event_store;
pub mod history;
pub mod projections;
pub mod read_model;
pub mod registry;


pub use command_dispatcher::{CommandDispatcher, DispatchError};
pub use event_store::{EventStore, EventStoreError, InMemoryEventStore, StoredEvent, UncommittedEvent};
#[cfg(feature = "postgres")]
pub use event_store::PostgresEventStore;
pub use history::{HistoryError, MovementRecord, MovementType, item_history};
pub use read_model::{InMemoryReadModelStore, ReadModelStore};
pub use registry::{
    Category, CategoryRegistry, CustomerDirectory, CustomerProfile, LocationRegistry, Subcategory,
};
