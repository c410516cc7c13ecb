//! Projections: disposable read models fed by published envelopes.
//!
//! Every projection here follows the same contract:
//! - consumes `EventEnvelope<JsonValue>` from the bus
//! - tracks a per-stream sequence cursor, so at-least-once delivery and
//!   replays are idempotent
//! - can be rebuilt from scratch by replaying the ledger

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use goldsmith_core::AggregateId;

pub mod catalog;
pub mod item_state;
pub mod location_totals;
pub mod raw_gold;
pub mod shadow_orders;
pub mod sold_items;

pub use catalog::{ProductCatalogProjection, ProductReadModel};
pub use item_state::{ItemFilter, ItemReadModel, ItemStateProjection, WeightRange};
pub use location_totals::{LocationTotals, summarize_locations};
pub use raw_gold::{RawGoldEntryRow, RawGoldProjection};
pub use shadow_orders::{ShadowOrder, ShadowOrderWriter};
pub use sold_items::{CustomerSales, ProductSales, SoldItemRow, SoldItemsProjection};

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("failed to deserialize event: {0}")]
    Deserialize(String),

    #[error("envelope does not match event payload: {0}")]
    StreamMismatch(String),

    #[error("non-monotonic sequence number (last={last}, found={found})")]
    NonMonotonicSequence { last: u64, found: u64 },

    /// A writer panicked while holding a read-model lock. Applying must
    /// stop (not silently skip) or the cursor would advance past an event
    /// the read model never absorbed.
    #[error("projection lock poisoned: {0}")]
    Poisoned(String),
}

/// Whether an envelope should be applied or silently skipped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum CursorGate {
    Apply,
    /// Duplicate or replay at or below the cursor.
    Skip,
}

/// Per-stream sequence cursors shared by all projections.
///
/// At-least-once delivery means an envelope can arrive twice; the cursor
/// makes the second arrival a no-op. A gap (sequence jumping past last+1)
/// is a delivery bug and is surfaced, not papered over.
#[derive(Debug, Default)]
pub(crate) struct StreamCursors {
    inner: RwLock<HashMap<AggregateId, u64>>,
}

impl StreamCursors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gate(&self, aggregate_id: AggregateId, seq: u64) -> Result<CursorGate, ProjectionError> {
        let cursors = self
            .inner
            .read()
            .map_err(|_| ProjectionError::Poisoned("stream cursors".to_string()))?;
        let last = *cursors.get(&aggregate_id).unwrap_or(&0);

        if seq == 0 {
            return Err(ProjectionError::NonMonotonicSequence { last, found: seq });
        }
        if seq <= last {
            return Ok(CursorGate::Skip);
        }
        // The first observed event may sit at any positive sequence (a
        // projection can attach mid-stream during rebuild); after that,
        // strict +1 increments are required.
        if last != 0 && seq != last + 1 {
            return Err(ProjectionError::NonMonotonicSequence { last, found: seq });
        }
        Ok(CursorGate::Apply)
    }

    pub fn advance(&self, aggregate_id: AggregateId, seq: u64) {
        if let Ok(mut cursors) = self.inner.write() {
            cursors.insert(aggregate_id, seq);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut cursors) = self.inner.write() {
            cursors.clear();
        }
    }
}
