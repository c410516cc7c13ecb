use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use goldsmith_catalog::{
    CreateProduct, Product, ProductCommand, ProductId, ProductUpdate, RetireProduct, UpdateProduct,
};
use goldsmith_core::{AggregateId, CategoryId, SubcategoryId};
use goldsmith_infra::projections::ItemFilter;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product).put(update_product))
        .route("/:id/retire", post(retire_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    let weight = match errors::parse_grams(&body.weight) {
        Ok(w) => w,
        Err(e) => return e.into_response(),
    };
    let category_id = match parse_optional_id::<CategoryId>(body.category_id, "category") {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let subcategory_id = match parse_optional_id::<SubcategoryId>(body.subcategory_id, "subcategory")
    {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    let agg = AggregateId::new();
    let product_id = ProductId(agg);

    let cmd = ProductCommand::CreateProduct(CreateProduct {
        product_id,
        name: body.name,
        weight,
        category_id,
        subcategory_id,
        image_url: body.image_url,
        live_stock: body.live_stock,
        occurred_at: Utc::now(),
    });

    let committed = match services.dispatch::<Product>(agg, "catalog.product", cmd, |id| {
        Product::empty(ProductId(id))
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

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let products: Vec<_> = services
        .catalog()
        .list()
        .iter()
        .map(dto::product_to_json)
        .collect();
    Json(products).into_response()
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id = match errors::parse_id::<AggregateId>(&id, "product") {
        Ok(id) => ProductId(id),
        Err(e) => return e.into_response(),
    };

    match services.catalog().get(&product_id) {
        Some(p) => Json(dto::product_to_json(&p)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateProductRequest>,
) -> axum::response::Response {
    let agg = match errors::parse_id::<AggregateId>(&id, "product") {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let category_id = match parse_optional_id::<CategoryId>(body.category_id, "category") {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let subcategory_id = match parse_optional_id::<SubcategoryId>(body.subcategory_id, "subcategory")
    {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    let cmd = ProductCommand::UpdateProduct(UpdateProduct {
        product_id: ProductId(agg),
        update: ProductUpdate {
            name: body.name,
            category_id,
            subcategory_id,
            image_url: body.image_url,
            live_stock: body.live_stock,
        },
        occurred_at: Utc::now(),
    });

    let committed = match services.dispatch::<Product>(agg, "catalog.product", cmd, |id| {
        Product::empty(ProductId(id))
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

/// Retire (tombstone) a product. Refused while unsold physical pieces of it
/// are still on hand; sell or re-home those first.
pub async fn retire_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::RetireProductRequest>,
) -> axum::response::Response {
    let agg = match errors::parse_id::<AggregateId>(&id, "product") {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let product_id = ProductId(agg);

    let unsold = services.items().filter(&ItemFilter {
        product_ids: Some(HashSet::from([product_id])),
        sold: Some(false),
        ..ItemFilter::default()
    });
    if !unsold.is_empty() {
        return errors::json_error(
            StatusCode::PRECONDITION_FAILED,
            "precondition_failed",
            format!("{} unsold piece(s) of this product still in stock", unsold.len()),
        );
    }

    let cmd = ProductCommand::RetireProduct(RetireProduct {
        product_id,
        reason: body.reason,
        occurred_at: Utc::now(),
    });

    let committed = match services.dispatch::<Product>(agg, "catalog.product", cmd, |id| {
        Product::empty(ProductId(id))
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

fn parse_optional_id<T: std::str::FromStr>(
    raw: Option<String>,
    what: &'static str,
) -> Result<Option<T>, errors::ApiError> {
    match raw {
        Some(s) => errors::parse_id::<T>(&s, what).map(Some),
        None => Ok(None),
    }
}
