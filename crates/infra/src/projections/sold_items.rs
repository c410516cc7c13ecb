use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use goldsmith_catalog::ProductId;
use goldsmith_core::{CustomerId, Grams, LocationId};
use goldsmith_events::EventEnvelope;
use goldsmith_stock::{StockItemEvent, StockItemId};

use super::{CursorGate, ProjectionError, StreamCursors};

/// One sale, denormalized at sale time.
///
/// `product_id` and `weight` are the values snapshotted into the ItemSold
/// event; later catalog edits never change historical sales figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoldItemRow {
    pub item_id: StockItemId,
    pub product_id: ProductId,
    pub weight: Grams,
    pub from_location_id: LocationId,
    pub sold_to_customer: Option<CustomerId>,
    pub sold_to_name: Option<String>,
    pub performed_by: String,
    pub remarks: Option<String>,
    pub sold_at: DateTime<Utc>,
}

/// Per-product sales tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSales {
    pub product_id: ProductId,
    pub times_sold: u64,
    pub total_weight: Grams,
}

/// Per-customer sales tally. Anonymous sales group under `customer = None`
/// keyed by the free-text buyer name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerSales {
    pub customer: Option<CustomerId>,
    pub name: Option<String>,
    pub orders: u64,
    pub total_weight: Grams,
}

/// Sold-items projection: the sales reporting read model.
///
/// Exactly one row per sale; the at-most-once sale guarantee upstream means
/// the same item can never appear twice.
#[derive(Debug, Default)]
pub struct SoldItemsProjection {
    rows: RwLock<Vec<SoldItemRow>>,
    cursors: StreamCursors,
}

impl SoldItemsProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flat snapshot of sales in a date window, oldest first.
    ///
    /// Reproducible: the ledger is immutable, so the same inputs always
    /// produce the same export.
    pub fn report(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Vec<SoldItemRow> {
        let rows = match self.rows.read() {
            Ok(r) => r,
            Err(_) => return vec![],
        };
        let mut out: Vec<_> = rows
            .iter()
            .filter(|r| in_window(r.sold_at, from, to))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            (a.sold_at, a.item_id.0.as_uuid()).cmp(&(b.sold_at, b.item_id.0.as_uuid()))
        });
        out
    }

    /// Top-N products by times sold (weight as tiebreaker), date-bounded.
    pub fn top_products(
        &self,
        n: usize,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Vec<ProductSales> {
        let mut tally: HashMap<ProductId, ProductSales> = HashMap::new();
        for row in self.report(from, to) {
            let entry = tally
                .entry(row.product_id)
                .or_insert_with(|| ProductSales {
                    product_id: row.product_id,
                    times_sold: 0,
                    total_weight: Grams::ZERO,
                });
            entry.times_sold += 1;
            entry.total_weight = entry.total_weight.saturating_add(row.weight);
        }

        let mut out: Vec<_> = tally.into_values().collect();
        out.sort_by(|a, b| {
            (b.times_sold, b.total_weight)
                .cmp(&(a.times_sold, a.total_weight))
                .then_with(|| a.product_id.0.as_uuid().cmp(b.product_id.0.as_uuid()))
        });
        out.truncate(n);
        out
    }

    /// Top-N customers by order count (weight as tiebreaker), date-bounded.
    pub fn top_customers(
        &self,
        n: usize,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Vec<CustomerSales> {
        // Registered buyers tally by id; walk-ins by the captured name.
        let mut tally: HashMap<(Option<CustomerId>, Option<String>), CustomerSales> =
            HashMap::new();
        for row in self.report(from, to) {
            let key = match row.sold_to_customer {
                Some(id) => (Some(id), None),
                None => (None, row.sold_to_name.clone()),
            };
            let entry = tally.entry(key.clone()).or_insert_with(|| CustomerSales {
                customer: key.0,
                name: key.1,
                orders: 0,
                total_weight: Grams::ZERO,
            });
            entry.orders += 1;
            entry.total_weight = entry.total_weight.saturating_add(row.weight);
            if entry.name.is_none() {
                entry.name = row.sold_to_name.clone();
            }
        }

        let mut out: Vec<_> = tally.into_values().collect();
        out.sort_by(|a, b| (b.orders, b.total_weight).cmp(&(a.orders, a.total_weight)));
        out.truncate(n);
        out
    }

    /// Apply a published envelope into the projection (idempotent).
    ///
    /// Only `ItemSold` contributes; every other stock event advances the
    /// cursor and is otherwise ignored.
    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<JsonValue>,
    ) -> Result<(), ProjectionError> {
        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();

        if self.cursors.gate(aggregate_id, seq)? == CursorGate::Skip {
            return Ok(());
        }

        let event: StockItemEvent = serde_json::from_value(envelope.payload().clone())
            .map_err(|e| ProjectionError::Deserialize(e.to_string()))?;

        if let StockItemEvent::ItemSold(e) = event {
            if e.item_id.0 != aggregate_id {
                return Err(ProjectionError::StreamMismatch(
                    "event item_id does not match envelope aggregate_id".to_string(),
                ));
            }
            let mut rows = self
                .rows
                .write()
                .map_err(|_| ProjectionError::Poisoned("sold item rows".to_string()))?;
            rows.push(SoldItemRow {
                item_id: e.item_id,
                product_id: e.product_id,
                weight: e.weight,
                from_location_id: e.from_location_id,
                sold_to_customer: e.sold_to_customer,
                sold_to_name: e.sold_to_name,
                performed_by: e.performed_by,
                remarks: e.remarks,
                sold_at: e.occurred_at,
            });
        }

        self.cursors.advance(aggregate_id, seq);
        Ok(())
    }

    /// Rebuild the read model from scratch by replaying envelopes.
    pub fn rebuild_from_scratch(
        &self,
        envelopes: impl IntoIterator<Item = EventEnvelope<JsonValue>>,
    ) -> Result<(), ProjectionError> {
        self.cursors.clear();
        self.rows
            .write()
            .map_err(|_| ProjectionError::Poisoned("sold item rows".to_string()))?
            .clear();

        let mut envs: Vec<_> = envelopes.into_iter().collect();
        envs.sort_by_key(|e| (*e.aggregate_id().as_uuid().as_bytes(), e.sequence_number()));

        for env in &envs {
            self.apply_envelope(env)?;
        }
        Ok(())
    }
}

fn in_window(at: DateTime<Utc>, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> bool {
    if let Some(from) = from {
        if at < from {
            return false;
        }
    }
    if let Some(to) = to {
        if at > to {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    use goldsmith_core::AggregateId;
    use goldsmith_stock::ItemSold;
    use uuid::Uuid;

    fn sold_envelope(item_id: StockItemId, seq: u64) -> EventEnvelope<JsonValue> {
        let event = StockItemEvent::ItemSold(ItemSold {
            item_id,
            from_location_id: LocationId::new(),
            product_id: ProductId::new(AggregateId::new()),
            weight: "5.000".parse().unwrap(),
            performed_by: "admin".to_string(),
            remarks: None,
            sold_to_customer: None,
            sold_to_name: Some("Walk-in".to_string()),
            occurred_at: Utc::now(),
        });
        EventEnvelope::new(
            Uuid::now_v7(),
            item_id.0,
            "stock.item",
            seq,
            serde_json::to_value(&event).unwrap(),
        )
    }

    #[test]
    fn poisoned_rows_lock_is_an_error_and_leaves_the_cursor_behind() {
        let projection = SoldItemsProjection::new();
        let item_id = StockItemId::new(AggregateId::new());

        // Poison the rows lock by panicking while holding the write guard.
        let poisoner = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = projection.rows.write().unwrap();
            panic!("poison");
        }));
        assert!(poisoner.is_err());

        // The sale must be surfaced as an error, not silently dropped with
        // the cursor advanced past it.
        let err = projection.apply_envelope(&sold_envelope(item_id, 1)).unwrap_err();
        assert!(matches!(err, ProjectionError::Poisoned(_)));
        assert_eq!(
            projection.cursors.gate(item_id.0, 1).unwrap(),
            CursorGate::Apply
        );
    }
}
