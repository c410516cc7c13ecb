//! Per-item movement history, read straight off the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use goldsmith_core::LocationId;
use goldsmith_stock::{StockItemEvent, StockItemId};

use crate::event_store::{EventStore, EventStoreError};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    Move,
    Sale,
}

/// One ledger row of an item's location history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub movement_type: MovementType,
    pub item_id: StockItemId,
    pub from_location_id: LocationId,
    /// `None` for a sale (the item leaves the location graph).
    pub to_location_id: Option<LocationId>,
    pub performed_by: String,
    pub remarks: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub sequence_number: u64,
}

#[derive(Debug)]
pub enum HistoryError {
    Store(EventStoreError),
    Deserialize(String),
}

impl From<EventStoreError> for HistoryError {
    fn from(value: EventStoreError) -> Self {
        HistoryError::Store(value)
    }
}

/// Full movement history for one item, most recent first.
///
/// Replays the item's event stream and keeps the movement rows (moves and
/// the sale); intake and visibility flips are not movements. The ledger is
/// gapless by construction, so so is this view.
pub fn item_history(
    store: &impl EventStore,
    item_id: StockItemId,
) -> Result<Vec<MovementRecord>, HistoryError> {
    let stream = store.load_stream(item_id.0)?;

    let mut records = Vec::new();
    for stored in stream {
        let event: StockItemEvent = serde_json::from_value(stored.payload)
            .map_err(|e| HistoryError::Deserialize(e.to_string()))?;

        if !event.is_movement() {
            continue;
        }

        let record = match event {
            StockItemEvent::ItemMoved(e) => MovementRecord {
                movement_type: MovementType::Move,
                item_id: e.item_id,
                from_location_id: e.from_location_id,
                to_location_id: Some(e.to_location_id),
                performed_by: e.performed_by,
                remarks: e.remarks,
                occurred_at: e.occurred_at,
                sequence_number: stored.sequence_number,
            },
            StockItemEvent::ItemSold(e) => MovementRecord {
                movement_type: MovementType::Sale,
                item_id: e.item_id,
                from_location_id: e.from_location_id,
                to_location_id: None,
                performed_by: e.performed_by,
                remarks: e.remarks,
                occurred_at: e.occurred_at,
                sequence_number: stored.sequence_number,
            },
            _ => continue,
        };
        records.push(record);
    }

    // Most recent first.
    records.sort_by(|a, b| b.sequence_number.cmp(&a.sequence_number));
    Ok(records)
}
