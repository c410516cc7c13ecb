use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use goldsmith_core::{AggregateId, CategoryId, CustomerId, LocationId, SubcategoryId};
use goldsmith_infra::projections::{ItemFilter, ItemReadModel, WeightRange};
use goldsmith_infra::item_history;
use goldsmith_stock::{
    MoveItem, ReceiveItem, SellItem, SetWebsiteVisibility, StockItem, StockItemCommand,
    StockItemId,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(receive_item).get(list_items))
        .route("/:id", get(get_item))
        .route("/:id/history", get(get_item_history))
        .route("/:id/move", post(move_item))
        .route("/:id/sell", post(sell_item))
        .route("/:id/visibility", post(set_visibility))
        .route("/bulk/move", post(bulk_move))
        .route("/bulk/sell", post(bulk_sell))
}

/// Stock intake: one physical piece enters the ledger at a location.
pub async fn receive_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::ReceiveItemRequest>,
) -> axum::response::Response {
    let product_id = match errors::parse_id::<AggregateId>(&body.product_id, "product") {
        Ok(id) => goldsmith_catalog::ProductId(id),
        Err(e) => return e.into_response(),
    };
    let location_id = match errors::parse_id::<LocationId>(&body.location_id, "location") {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    if let Err(e) = services.locations().ensure_exists(location_id) {
        return errors::domain_error_to_response(e);
    }

    let Some(product) = services.catalog().get(&product_id) else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found");
    };

    // Per-piece weight when given; the catalog weight otherwise.
    let weight = match body.weight {
        Some(raw) => match errors::parse_grams(&raw) {
            Ok(w) => w,
            Err(e) => return e.into_response(),
        },
        None => product.weight,
    };

    let agg = AggregateId::new();
    let item_id = StockItemId(agg);

    let cmd = StockItemCommand::ReceiveItem(ReceiveItem {
        item_id,
        product_id,
        weight,
        location_id,
        performed_by: actor.performed_by().to_string(),
        occurred_at: Utc::now(),
    });

    let committed = match services.dispatch::<StockItem>(agg, "stock.item", cmd, |id| {
        StockItem::empty(StockItemId(id))
    }) {
        Ok(c) => c,
        Err(e) => return errors::dispatch_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": agg.to_string(),
            "events_committed": committed.len(),
        })),
    )
        .into_response()
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ItemFilterQuery>,
) -> axum::response::Response {
    let filter = match build_filter(&services, query) {
        Ok(f) => f,
        Err(e) => return e.into_response(),
    };

    let items: Vec<_> = services
        .items()
        .filter(&filter)
        .iter()
        .map(|item| dto::item_to_json(item, &item_names(&services, item)))
        .collect();
    Json(items).into_response()
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let item_id = match errors::parse_id::<AggregateId>(&id, "item") {
        Ok(id) => StockItemId(id),
        Err(e) => return e.into_response(),
    };

    match services.items().get(&item_id) {
        Some(item) => Json(dto::item_to_json(&item, &item_names(&services, &item))).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "item not found"),
    }
}

/// Movement history straight off the ledger, most recent first, with
/// location names joined from the registry.
pub async fn get_item_history(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let item_id = match errors::parse_id::<AggregateId>(&id, "item") {
        Ok(id) => StockItemId(id),
        Err(e) => return e.into_response(),
    };

    let movements = match item_history(services.event_store(), item_id) {
        Ok(m) => m,
        Err(e) => {
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                format!("{e:?}"),
            )
        }
    };

    let rows: Vec<_> = movements
        .iter()
        .map(|m| {
            let from_name = services.locations().get(m.from_location_id).map(|l| l.name);
            let to_name = m
                .to_location_id
                .and_then(|id| services.locations().get(id))
                .map(|l| l.name);
            dto::movement_to_json(m, from_name, to_name)
        })
        .collect();
    Json(rows).into_response()
}

pub async fn move_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::MoveItemRequest>,
) -> axum::response::Response {
    let agg = match errors::parse_id::<AggregateId>(&id, "item") {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match dispatch_move(
        &services,
        &actor,
        agg,
        &body.from_location_id,
        &body.to_location_id,
        body.remarks,
    ) {
        Ok(committed) => Json(serde_json::json!({
            "id": agg.to_string(),
            "events_committed": committed,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn sell_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SellItemRequest>,
) -> axum::response::Response {
    let agg = match errors::parse_id::<AggregateId>(&id, "item") {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match dispatch_sell(
        &services,
        &actor,
        agg,
        &body.from_location_id,
        body.sold_to_customer,
        body.sold_to_name,
        body.remarks,
    ) {
        Ok(committed) => Json(serde_json::json!({
            "id": agg.to_string(),
            "events_committed": committed,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn set_visibility(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetVisibilityRequest>,
) -> axum::response::Response {
    let agg = match errors::parse_id::<AggregateId>(&id, "item") {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    let cmd = StockItemCommand::SetWebsiteVisibility(SetWebsiteVisibility {
        item_id: StockItemId(agg),
        visible: body.visible,
        occurred_at: Utc::now(),
    });

    let committed = match services.dispatch::<StockItem>(agg, "stock.item", cmd, |id| {
        StockItem::empty(StockItemId(id))
    }) {
        Ok(c) => c,
        Err(e) => return errors::dispatch_error_to_response(e),
    };

    Json(serde_json::json!({
        "id": agg.to_string(),
        "events_committed": committed.len(),
    }))
    .into_response()
}

/// Move many items in one call. Each item is processed independently:
/// failures are reported per item, the rest go through (no batch rollback).
pub async fn bulk_move(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::BulkMoveRequest>,
) -> axum::response::Response {
    let mut results = Vec::with_capacity(body.items.len());
    let mut ok = 0usize;
    let mut failed = 0usize;

    for entry in body.items {
        let outcome = match errors::parse_id::<AggregateId>(&entry.item_id, "item") {
            Ok(agg) => dispatch_move(
                &services,
                &actor,
                agg,
                &entry.from_location_id,
                &entry.to_location_id,
                entry.remarks,
            )
            .map(|_| ()),
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(()) => ok += 1,
            Err(_) => failed += 1,
        }
        results.push(bulk_result_row(&entry.item_id, &outcome));
    }

    Json(serde_json::json!({
        "ok": ok,
        "failed": failed,
        "results": results,
    }))
    .into_response()
}

/// Sell many items in one call; same per-item independence as bulk move.
pub async fn bulk_sell(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::BulkSellRequest>,
) -> axum::response::Response {
    let mut results = Vec::with_capacity(body.items.len());
    let mut ok = 0usize;
    let mut failed = 0usize;

    for entry in body.items {
        let outcome = match errors::parse_id::<AggregateId>(&entry.item_id, "item") {
            Ok(agg) => dispatch_sell(
                &services,
                &actor,
                agg,
                &entry.from_location_id,
                entry.sold_to_customer,
                entry.sold_to_name,
                entry.remarks,
            )
            .map(|_| ()),
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(()) => ok += 1,
            Err(_) => failed += 1,
        }
        results.push(bulk_result_row(&entry.item_id, &outcome));
    }

    Json(serde_json::json!({
        "ok": ok,
        "failed": failed,
        "results": results,
    }))
    .into_response()
}

/// One row of a bulk response. Failures carry the error code and message,
/// not just a status, so an operator can tell an already-sold piece from a
/// stale location without retrying one item at a time.
fn bulk_result_row(item_id: &str, outcome: &Result<(), errors::ApiError>) -> serde_json::Value {
    match outcome {
        Ok(()) => serde_json::json!({
            "item_id": item_id,
            "ok": true,
        }),
        Err(e) => serde_json::json!({
            "item_id": item_id,
            "ok": false,
            "status": e.status.as_u16(),
            "error": e.code,
            "message": e.message,
        }),
    }
}

fn dispatch_move(
    services: &AppServices,
    actor: &ActorContext,
    agg: AggregateId,
    from: &str,
    to: &str,
    remarks: Option<String>,
) -> Result<usize, errors::ApiError> {
    let from_location_id = errors::parse_id::<LocationId>(from, "location")?;
    let to_location_id = errors::parse_id::<LocationId>(to, "location")?;

    services
        .locations()
        .ensure_exists(to_location_id)
        .map_err(errors::ApiError::from_domain)?;

    let cmd = StockItemCommand::MoveItem(MoveItem {
        item_id: StockItemId(agg),
        from_location_id,
        to_location_id,
        performed_by: actor.performed_by().to_string(),
        remarks,
        occurred_at: Utc::now(),
    });

    services
        .dispatch::<StockItem>(agg, "stock.item", cmd, |id| {
            StockItem::empty(StockItemId(id))
        })
        .map(|committed| committed.len())
        .map_err(errors::ApiError::from_dispatch)
}

fn dispatch_sell(
    services: &AppServices,
    actor: &ActorContext,
    agg: AggregateId,
    from: &str,
    sold_to_customer: Option<String>,
    sold_to_name: Option<String>,
    remarks: Option<String>,
) -> Result<usize, errors::ApiError> {
    let from_location_id = errors::parse_id::<LocationId>(from, "location")?;

    let sold_to_customer = match sold_to_customer {
        Some(raw) => {
            let customer_id = errors::parse_id::<CustomerId>(&raw, "customer")?;
            if services.customers().get(customer_id).is_none() {
                return Err(errors::ApiError::new(
                    StatusCode::NOT_FOUND,
                    "not_found",
                    "customer not found",
                ));
            }
            Some(customer_id)
        }
        None => None,
    };

    let cmd = StockItemCommand::SellItem(SellItem {
        item_id: StockItemId(agg),
        from_location_id,
        performed_by: actor.performed_by().to_string(),
        remarks,
        sold_to_customer,
        sold_to_name,
        occurred_at: Utc::now(),
    });

    services
        .dispatch::<StockItem>(agg, "stock.item", cmd, |id| {
            StockItem::empty(StockItemId(id))
        })
        .map(|committed| committed.len())
        .map_err(errors::ApiError::from_dispatch)
}

/// Join display names onto an item row: the product and its category tree
/// from the catalog projection, the location from the registry.
fn item_names(services: &AppServices, item: &ItemReadModel) -> dto::ItemNames {
    let product = services.catalog().get(&item.product_id);
    let category_name = product
        .as_ref()
        .and_then(|p| p.category_id)
        .and_then(|id| services.categories().get_category(id))
        .map(|c| c.name);
    let subcategory_name = product
        .as_ref()
        .and_then(|p| p.subcategory_id)
        .and_then(|id| services.categories().get_subcategory(id))
        .map(|s| s.name);
    let location_name = item
        .location_id
        .and_then(|id| services.locations().get(id))
        .map(|l| l.name);
    dto::ItemNames {
        product_name: product.map(|p| p.name),
        category_name,
        subcategory_name,
        location_name,
    }
}

fn build_filter(
    services: &AppServices,
    query: dto::ItemFilterQuery,
) -> Result<ItemFilter, errors::ApiError> {
    let location_id = match query.location_id {
        Some(raw) => Some(errors::parse_id::<LocationId>(&raw, "location")?),
        None => None,
    };
    let category_id = match query.category_id {
        Some(raw) => Some(errors::parse_id::<CategoryId>(&raw, "category")?),
        None => None,
    };
    let subcategory_id = match query.subcategory_id {
        Some(raw) => Some(errors::parse_id::<SubcategoryId>(&raw, "subcategory")?),
        None => None,
    };

    // Category filters resolve to a product id set up front; the item
    // projection knows nothing about the catalog.
    let product_ids = if category_id.is_some() || subcategory_id.is_some() {
        Some(services.catalog().product_ids_in(category_id, subcategory_id))
    } else {
        None
    };

    let weight_range = match (query.min_weight, query.max_weight) {
        (None, None) => None,
        (min, max) => {
            let min = match min {
                Some(raw) => errors::parse_grams(&raw)?,
                None => goldsmith_core::Grams::from_milligrams(i64::MIN),
            };
            let max = match max {
                Some(raw) => errors::parse_grams(&raw)?,
                None => goldsmith_core::Grams::from_milligrams(i64::MAX),
            };
            Some(WeightRange { min, max })
        }
    };

    Ok(ItemFilter {
        location_id,
        product_ids,
        weight_range,
        show_on_website: query.show_on_website,
        sold: query.sold,
    })
}


#[cfg(test)]
mod tests {
    use goldsmith_infra::DispatchError;

    use super::*;

    #[test]
    fn bulk_failure_rows_carry_the_error_message() {
        let err = errors::ApiError::from_dispatch(DispatchError::Precondition(
            "item already sold".into(),
        ));

        let row = bulk_result_row("0198c0de-0000-7000-8000-000000000001", &Err(err));
        assert_eq!(row["ok"], false);
        assert_eq!(row["status"], 412);
        assert_eq!(row["error"], "precondition_failed");
        assert_eq!(row["message"], "item already sold");
    }

    #[test]
    fn bulk_success_rows_echo_the_item_id() {
        let row = bulk_result_row("0198c0de-0000-7000-8000-000000000002", &Ok(()));
        assert_eq!(row["ok"], true);
        assert_eq!(row["item_id"], "0198c0de-0000-7000-8000-000000000002");
    }
}
