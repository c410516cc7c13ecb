use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use goldsmith_core::CategoryId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_category).get(list_categories))
        .route("/:id/subcategories", post(create_subcategory))
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateCategoryRequest>,
) -> axum::response::Response {
    match services.categories().create_category(body.name) {
        Ok(category) => (
            StatusCode::CREATED,
            Json(dto::category_to_json(&category, &[])),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_subcategory(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::CreateSubcategoryRequest>,
) -> axum::response::Response {
    let category_id = match errors::parse_id::<CategoryId>(&id, "category") {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match services
        .categories()
        .create_subcategory(category_id, body.name)
    {
        Ok(subcategory) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "id": subcategory.id.to_string(),
                "category_id": subcategory.category_id.to_string(),
                "name": subcategory.name,
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let categories: Vec<_> = services
        .categories()
        .list_categories()
        .iter()
        .map(|c| {
            let subcategories = services.categories().list_subcategories(c.id);
            dto::category_to_json(c, &subcategories)
        })
        .collect();
    Json(categories).into_response()
}
