use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

const DEFAULT_TOP_N: usize = 10;

pub fn router() -> Router {
    Router::new()
        .route("/top-products", get(top_products))
        .route("/top-customers", get(top_customers))
        .route("/sales", get(sales))
}

pub async fn top_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ReportQuery>,
) -> axum::response::Response {
    let (from, to, limit) = match parse_report_query(query) {
        Ok(parts) => parts,
        Err(e) => return e.into_response(),
    };

    let rows: Vec<_> = services
        .sold_items()
        .top_products(limit, from, to)
        .iter()
        .map(|p| {
            let name = services.catalog().get(&p.product_id).map(|rm| rm.name);
            dto::product_sales_to_json(p, name)
        })
        .collect();
    Json(rows).into_response()
}

pub async fn top_customers(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ReportQuery>,
) -> axum::response::Response {
    let (from, to, limit) = match parse_report_query(query) {
        Ok(parts) => parts,
        Err(e) => return e.into_response(),
    };

    let rows: Vec<_> = services
        .sold_items()
        .top_customers(limit, from, to)
        .iter()
        .map(|c| {
            let name = c
                .customer
                .and_then(|id| services.customers().get(id))
                .map(|profile| profile.name);
            dto::customer_sales_to_json(c, name)
        })
        .collect();
    Json(rows).into_response()
}

/// Flat export of sales in a date window, oldest first. Reproducible: the
/// ledger is immutable, so the same window always yields the same rows.
pub async fn sales(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ReportQuery>,
) -> axum::response::Response {
    let (from, to, _) = match parse_report_query(query) {
        Ok(parts) => parts,
        Err(e) => return e.into_response(),
    };

    let rows: Vec<_> = services
        .sold_items()
        .report(from, to)
        .iter()
        .map(dto::sold_item_to_json)
        .collect();
    Json(rows).into_response()
}

type ReportWindow = (Option<DateTime<Utc>>, Option<DateTime<Utc>>, usize);

fn parse_report_query(query: dto::ReportQuery) -> Result<ReportWindow, errors::ApiError> {
    let from = parse_bound(query.from, "from")?;
    let to = parse_bound(query.to, "to")?;
    Ok((from, to, query.limit.unwrap_or(DEFAULT_TOP_N)))
}

fn parse_bound(
    raw: Option<String>,
    what: &'static str,
) -> Result<Option<DateTime<Utc>>, errors::ApiError> {
    match raw {
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| {
                errors::ApiError::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_date",
                    format!("invalid {what} bound '{s}': {e}"),
                )
            }),
        None => Ok(None),
    }
}
