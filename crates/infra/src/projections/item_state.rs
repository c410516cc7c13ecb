use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use goldsmith_catalog::ProductId;
use goldsmith_core::{CustomerId, Grams, LocationId};
use goldsmith_events::EventEnvelope;
use goldsmith_stock::{StockItemEvent, StockItemId};

use super::{CursorGate, ProjectionError, StreamCursors};
use crate::read_model::ReadModelStore;

/// Queryable current state of one physical item.
///
/// Denormalized from the item's event stream: `location_id` is `None` iff
/// `sold` is true, mirroring the tagged state in the write model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReadModel {
    pub item_id: StockItemId,
    pub product_id: ProductId,
    pub weight: Grams,
    pub show_on_website: bool,
    pub location_id: Option<LocationId>,
    pub sold: bool,
    pub sold_at: Option<DateTime<Utc>>,
    pub sold_to_customer: Option<CustomerId>,
    pub sold_to_name: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// Inclusive weight bounds for filtering.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WeightRange {
    pub min: Grams,
    pub max: Grams,
}

impl WeightRange {
    pub fn contains(&self, weight: Grams) -> bool {
        self.min <= weight && weight <= self.max
    }
}

/// Filter options for the item listing query.
///
/// `product_ids` is pre-resolved by the caller (category/subcategory
/// filters become a product id set before reaching the projection, which
/// knows nothing about the catalog).
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub location_id: Option<LocationId>,
    pub product_ids: Option<HashSet<ProductId>>,
    pub weight_range: Option<WeightRange>,
    pub show_on_website: Option<bool>,
    pub sold: Option<bool>,
}

/// Current-item-state projection.
///
/// Consumes published stock envelopes and maintains the per-item read
/// model behind the item listing and the location summary. Disposable:
/// deletable and rebuildable from the ledger at any time.
#[derive(Debug)]
pub struct ItemStateProjection<S>
where
    S: ReadModelStore<StockItemId, ItemReadModel>,
{
    store: S,
    cursors: StreamCursors,
}

impl<S> ItemStateProjection<S>
where
    S: ReadModelStore<StockItemId, ItemReadModel>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            cursors: StreamCursors::new(),
        }
    }

    pub fn get(&self, item_id: &StockItemId) -> Option<ItemReadModel> {
        self.store.get(item_id)
    }

    pub fn list(&self) -> Vec<ItemReadModel> {
        let mut items = self.store.list();
        sort_newest_first(&mut items);
        items
    }

    /// The single filtering query behind the stock screens.
    ///
    /// Ordering: item id descending (ids are time-ordered, so newest
    /// first). When `sold == Some(true)` the location filter is skipped:
    /// sold items have no location by invariant, so applying both would
    /// always return nothing.
    pub fn filter(&self, filter: &ItemFilter) -> Vec<ItemReadModel> {
        let location_filter = match filter.sold {
            Some(true) => None,
            _ => filter.location_id,
        };

        let mut items: Vec<ItemReadModel> = self
            .store
            .list()
            .into_iter()
            .filter(|item| {
                if let Some(sold) = filter.sold {
                    if item.sold != sold {
                        return false;
                    }
                }
                if let Some(location_id) = location_filter {
                    if item.location_id != Some(location_id) {
                        return false;
                    }
                }
                if let Some(product_ids) = &filter.product_ids {
                    if !product_ids.contains(&item.product_id) {
                        return false;
                    }
                }
                if let Some(range) = &filter.weight_range {
                    if !range.contains(item.weight) {
                        return false;
                    }
                }
                if let Some(visible) = filter.show_on_website {
                    if item.show_on_website != visible {
                        return false;
                    }
                }
                true
            })
            .collect();

        sort_newest_first(&mut items);
        items
    }

    /// Apply a published envelope into the projection.
    ///
    /// Idempotent for at-least-once delivery; replays at or below the
    /// cursor are ignored. Envelopes for other aggregate types are skipped
    /// by the deserialization check in the caller.
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

        let item_id = match &event {
            StockItemEvent::ItemReceived(e) => e.item_id,
            StockItemEvent::ItemMoved(e) => e.item_id,
            StockItemEvent::ItemSold(e) => e.item_id,
            StockItemEvent::VisibilityChanged(e) => e.item_id,
        };
        if item_id.0 != aggregate_id {
            return Err(ProjectionError::StreamMismatch(
                "event item_id does not match envelope aggregate_id".to_string(),
            ));
        }

        match event {
            StockItemEvent::ItemReceived(e) => {
                self.store.upsert(
                    e.item_id,
                    ItemReadModel {
                        item_id: e.item_id,
                        product_id: e.product_id,
                        weight: e.weight,
                        show_on_website: false,
                        location_id: Some(e.location_id),
                        sold: false,
                        sold_at: None,
                        sold_to_customer: None,
                        sold_to_name: None,
                        received_at: e.occurred_at,
                    },
                );
            }
            StockItemEvent::ItemMoved(e) => {
                if let Some(mut rm) = self.store.get(&e.item_id) {
                    rm.location_id = Some(e.to_location_id);
                    self.store.upsert(e.item_id, rm);
                }
            }
            StockItemEvent::ItemSold(e) => {
                if let Some(mut rm) = self.store.get(&e.item_id) {
                    rm.sold = true;
                    rm.sold_at = Some(e.occurred_at);
                    rm.location_id = None;
                    rm.sold_to_customer = e.sold_to_customer;
                    rm.sold_to_name = e.sold_to_name;
                    self.store.upsert(e.item_id, rm);
                }
            }
            StockItemEvent::VisibilityChanged(e) => {
                if let Some(mut rm) = self.store.get(&e.item_id) {
                    rm.show_on_website = e.visible;
                    self.store.upsert(e.item_id, rm);
                }
            }
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
        self.store.clear();

        // Deterministic replay order: aggregate, then sequence.
        let mut envs: Vec<_> = envelopes.into_iter().collect();
        envs.sort_by_key(|e| (*e.aggregate_id().as_uuid().as_bytes(), e.sequence_number()));

        for env in &envs {
            self.apply_envelope(env)?;
        }
        Ok(())
    }
}

fn sort_newest_first(items: &mut [ItemReadModel]) {
    // Item ids are uuid-v7, so byte order is creation order.
    items.sort_by(|a, b| b.item_id.0.as_uuid().as_bytes().cmp(a.item_id.0.as_uuid().as_bytes()));
}
