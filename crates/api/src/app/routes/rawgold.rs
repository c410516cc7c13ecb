use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use goldsmith_rawgold::{EntryKind, RawGoldCommand, RawGoldLedger, RawGoldLedgerId, RecordEntry};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::ActorContext;

pub fn router() -> Router {
    Router::new()
        .route("/entries", post(record_entry).get(list_entries))
        .route("/balance", get(balance))
}

pub async fn record_entry(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorContext>,
    Json(body): Json<dto::RecordRawGoldEntryRequest>,
) -> axum::response::Response {
    let kind = match body.kind.parse::<EntryKind>() {
        Ok(kind) => kind,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_entry_kind",
                "kind must be one of: received, used, wastage, returned, adjustment",
            )
        }
    };
    let weight = match errors::parse_grams(&body.weight) {
        Ok(w) => w,
        Err(e) => return e.into_response(),
    };

    let ledger_id = services.raw_gold_ledger_id();

    let cmd = RawGoldCommand::RecordEntry(RecordEntry {
        ledger_id: RawGoldLedgerId(ledger_id),
        kind,
        weight,
        notes: body.notes,
        performed_by: actor.performed_by().to_string(),
        occurred_at: Utc::now(),
    });

    let committed = match services.dispatch::<RawGoldLedger>(ledger_id, "rawgold.ledger", cmd, |id| {
        RawGoldLedger::empty(RawGoldLedgerId(id))
    }) {
        Ok(c) => c,
        Err(e) => return errors::dispatch_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "events_committed": committed.len(),
        })),
    )
        .into_response()
}

/// Entry list with running balance, newest first.
pub async fn list_entries(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    let entries: Vec<_> = services
        .raw_gold()
        .entries_newest_first()
        .iter()
        .map(dto::raw_gold_entry_to_json)
        .collect();
    Json(entries).into_response()
}

pub async fn balance(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    Json(serde_json::json!({
        "available": services.raw_gold().available().to_string(),
    }))
    .into_response()
}
