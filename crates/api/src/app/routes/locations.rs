use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use goldsmith_infra::projections::summarize_locations;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_location).get(list_locations))
        .route("/summary", get(location_summary))
}

pub async fn create_location(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateLocationRequest>,
) -> axum::response::Response {
    match services.locations().create(body.name, body.code) {
        Ok(location) => {
            (StatusCode::CREATED, Json(dto::location_to_json(&location))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_locations(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let locations: Vec<_> = services
        .locations()
        .list()
        .iter()
        .map(dto::location_to_json)
        .collect();
    Json(locations).into_response()
}

/// Per-location piece count and total weight over unsold items. The shop
/// reconciles the physical count at each spot against this.
pub async fn location_summary(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let totals = summarize_locations(services.items().list());

    let rows: Vec<_> = totals
        .iter()
        .map(|t| {
            let name = services.locations().get(t.location_id).map(|l| l.name);
            dto::location_totals_to_json(t, name)
        })
        .collect();
    Json(rows).into_response()
}
