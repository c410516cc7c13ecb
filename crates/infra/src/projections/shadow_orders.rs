use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;
use uuid::Uuid;

use goldsmith_catalog::ProductId;
use goldsmith_core::{CustomerId, Grams};
use goldsmith_events::EventEnvelope;
use goldsmith_stock::{StockItemEvent, StockItemId};

use super::{CursorGate, StreamCursors};

/// A synthetic internal order mirroring an in-store sale.
///
/// Keeps counter sales visible in the same reporting tables as website
/// orders. Advisory only: the ledger's sale fact is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowOrder {
    pub order_id: Uuid,
    pub item_id: StockItemId,
    pub product_id: ProductId,
    pub weight: Grams,
    pub customer: Option<CustomerId>,
    pub customer_name: Option<String>,
    pub sold_at: DateTime<Utc>,
}

/// Best-effort shadow-order writer.
///
/// Unlike the projections, this consumer never fails the pipeline: any
/// problem is logged at warn level and the event is dropped. A missing
/// shadow order is a reporting gap, not an inventory fact.
#[derive(Debug, Default)]
pub struct ShadowOrderWriter {
    orders: RwLock<Vec<ShadowOrder>>,
    cursors: StreamCursors,
}

impl ShadowOrderWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Vec<ShadowOrder> {
        match self.orders.read() {
            Ok(orders) => orders.clone(),
            Err(_) => vec![],
        }
    }

    /// Apply a published envelope, creating a shadow order for each sale.
    pub fn apply_envelope(&self, envelope: &EventEnvelope<JsonValue>) {
        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();

        match self.cursors.gate(aggregate_id, seq) {
            Ok(CursorGate::Apply) => {}
            Ok(CursorGate::Skip) => return,
            Err(err) => {
                warn!(%aggregate_id, seq, %err, "shadow order writer skipped out-of-order event");
                return;
            }
        }

        let event: StockItemEvent = match serde_json::from_value(envelope.payload().clone()) {
            Ok(ev) => ev,
            Err(err) => {
                warn!(%aggregate_id, seq, %err, "shadow order writer could not decode event");
                self.cursors.advance(aggregate_id, seq);
                return;
            }
        };

        if let StockItemEvent::ItemSold(e) = event {
            if let Ok(mut orders) = self.orders.write() {
                orders.push(ShadowOrder {
                    order_id: Uuid::now_v7(),
                    item_id: e.item_id,
                    product_id: e.product_id,
                    weight: e.weight,
                    customer: e.sold_to_customer,
                    customer_name: e.sold_to_name,
                    sold_at: e.occurred_at,
                });
            }
        }

        self.cursors.advance(aggregate_id, seq);
    }
}
