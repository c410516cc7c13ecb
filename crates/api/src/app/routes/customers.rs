use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use goldsmith_core::CustomerId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_customer).get(list_customers))
        .route("/:id", get(get_customer))
        .route("/:id/balance", put(set_balance))
}

pub async fn create_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateCustomerRequest>,
) -> axum::response::Response {
    match services.customers().create(body.name, body.phone) {
        Ok(profile) => {
            (StatusCode::CREATED, Json(dto::customer_to_json(&profile))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_customers(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let customers: Vec<_> = services
        .customers()
        .list()
        .iter()
        .map(dto::customer_to_json)
        .collect();
    Json(customers).into_response()
}

pub async fn get_customer(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let customer_id = match errors::parse_id::<CustomerId>(&id, "customer") {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match services.customers().get(customer_id) {
        Some(profile) => Json(dto::customer_to_json(&profile)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "customer not found"),
    }
}

/// Overwrite the manual balance (admin bookkeeping field; may be negative).
pub async fn set_balance(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetCustomerBalanceRequest>,
) -> axum::response::Response {
    let customer_id = match errors::parse_id::<CustomerId>(&id, "customer") {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let balance = match errors::parse_grams(&body.balance) {
        Ok(b) => b,
        Err(e) => return e.into_response(),
    };

    match services.customers().set_balance(customer_id, balance) {
        Ok(profile) => Json(dto::customer_to_json(&profile)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
