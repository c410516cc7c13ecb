use std::collections::HashSet;

use serde_json::Value as JsonValue;

use goldsmith_catalog::{ProductEvent, ProductId};
use goldsmith_core::{CategoryId, Grams, SubcategoryId};
use goldsmith_events::EventEnvelope;

use super::{CursorGate, ProjectionError, StreamCursors};
use crate::read_model::ReadModelStore;

/// Queryable catalog read model: one row per product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductReadModel {
    pub product_id: ProductId,
    pub name: String,
    pub weight: Grams,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub image_url: Option<String>,
    pub live_stock: bool,
    pub retired: bool,
}

/// Product catalog projection.
///
/// Retired products stay in the read model (tombstoned, `retired = true`)
/// so historical item and sale rows can still resolve their names.
#[derive(Debug)]
pub struct ProductCatalogProjection<S>
where
    S: ReadModelStore<ProductId, ProductReadModel>,
{
    store: S,
    cursors: StreamCursors,
}

impl<S> ProductCatalogProjection<S>
where
    S: ReadModelStore<ProductId, ProductReadModel>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            cursors: StreamCursors::new(),
        }
    }

    pub fn get(&self, product_id: &ProductId) -> Option<ProductReadModel> {
        self.store.get(product_id)
    }

    /// Active (non-retired) products.
    pub fn list(&self) -> Vec<ProductReadModel> {
        let mut products: Vec<_> = self
            .store
            .list()
            .into_iter()
            .filter(|p| !p.retired)
            .collect();
        products.sort_by(|a, b| b.product_id.0.as_uuid().cmp(a.product_id.0.as_uuid()));
        products
    }

    /// Resolve a category/subcategory filter into the matching product id
    /// set (what the item filter actually understands).
    pub fn product_ids_in(
        &self,
        category_id: Option<CategoryId>,
        subcategory_id: Option<SubcategoryId>,
    ) -> HashSet<ProductId> {
        self.store
            .list()
            .into_iter()
            .filter(|p| {
                if let Some(category_id) = category_id {
                    if p.category_id != Some(category_id) {
                        return false;
                    }
                }
                if let Some(subcategory_id) = subcategory_id {
                    if p.subcategory_id != Some(subcategory_id) {
                        return false;
                    }
                }
                true
            })
            .map(|p| p.product_id)
            .collect()
    }

    /// Apply a published envelope into the projection (idempotent).
    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<JsonValue>,
    ) -> Result<(), ProjectionError> {
        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();

        if self.cursors.gate(aggregate_id, seq)? == CursorGate::Skip {
            return Ok(());
        }

        let event: ProductEvent = serde_json::from_value(envelope.payload().clone())
            .map_err(|e| ProjectionError::Deserialize(e.to_string()))?;

        let product_id = match &event {
            ProductEvent::ProductCreated(e) => e.product_id,
            ProductEvent::ProductUpdated(e) => e.product_id,
            ProductEvent::ProductRetired(e) => e.product_id,
        };
        if product_id.0 != aggregate_id {
            return Err(ProjectionError::StreamMismatch(
                "event product_id does not match envelope aggregate_id".to_string(),
            ));
        }

        match event {
            ProductEvent::ProductCreated(e) => {
                self.store.upsert(
                    e.product_id,
                    ProductReadModel {
                        product_id: e.product_id,
                        name: e.name,
                        weight: e.weight,
                        category_id: e.category_id,
                        subcategory_id: e.subcategory_id,
                        image_url: e.image_url,
                        live_stock: e.live_stock,
                        retired: false,
                    },
                );
            }
            ProductEvent::ProductUpdated(e) => {
                if let Some(mut rm) = self.store.get(&e.product_id) {
                    if let Some(name) = e.update.name {
                        rm.name = name;
                    }
                    if let Some(category_id) = e.update.category_id {
                        rm.category_id = Some(category_id);
                    }
                    if let Some(subcategory_id) = e.update.subcategory_id {
                        rm.subcategory_id = Some(subcategory_id);
                    }
                    if let Some(image_url) = e.update.image_url {
                        rm.image_url = Some(image_url);
                    }
                    if let Some(live_stock) = e.update.live_stock {
                        rm.live_stock = live_stock;
                    }
                    self.store.upsert(e.product_id, rm);
                }
            }
            ProductEvent::ProductRetired(e) => {
                if let Some(mut rm) = self.store.get(&e.product_id) {
                    rm.retired = true;
                    self.store.upsert(e.product_id, rm);
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

        let mut envs: Vec<_> = envelopes.into_iter().collect();
        envs.sort_by_key(|e| (*e.aggregate_id().as_uuid().as_bytes(), e.sequence_number()));

        for env in &envs {
            self.apply_envelope(env)?;
        }
        Ok(())
    }
}
