use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use goldsmith_core::Grams;
use goldsmith_infra::DispatchError;

/// Error surfaced to API clients: an HTTP status plus a machine-readable
/// code and a human-readable message. Bulk endpoints embed the code and
/// message verbatim in per-item result rows, so an operator can tell an
/// "already sold" piece from a stale location without replaying the call.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn from_dispatch(err: DispatchError) -> Self {
        match err {
            DispatchError::Concurrency(msg) => Self::new(StatusCode::CONFLICT, "conflict", msg),
            DispatchError::Validation(msg) => {
                Self::new(StatusCode::BAD_REQUEST, "validation_error", msg)
            }
            DispatchError::Precondition(msg) => {
                Self::new(StatusCode::PRECONDITION_FAILED, "precondition_failed", msg)
            }
            DispatchError::NotFound => Self::new(StatusCode::NOT_FOUND, "not_found", "not found"),
            DispatchError::Deserialize(msg) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "deserialize_error", msg)
            }
            DispatchError::Store(e) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                format!("{e:?}"),
            ),
            DispatchError::Publish(msg) => {
                // The append succeeded; read models lag until replay. Alertable.
                tracing::error!("publish failed after append: {msg}");
                Self::new(StatusCode::BAD_GATEWAY, "publish_error", msg)
            }
        }
    }

    pub fn from_domain(err: goldsmith_core::DomainError) -> Self {
        Self::from_dispatch(DispatchError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        json_error(self.status, self.code, self.message)
    }
}

pub fn dispatch_error_to_response(err: DispatchError) -> axum::response::Response {
    ApiError::from_dispatch(err).into_response()
}

pub fn domain_error_to_response(err: goldsmith_core::DomainError) -> axum::response::Response {
    ApiError::from_domain(err).into_response()
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a weight given in grams (e.g. `"12.345"`).
pub fn parse_grams(s: &str) -> Result<Grams, ApiError> {
    s.parse::<Grams>().map_err(|e| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "invalid_weight",
            format!("invalid weight '{s}': {e}"),
        )
    })
}

pub fn parse_id<T: std::str::FromStr>(s: &str, what: &'static str) -> Result<T, ApiError> {
    s.parse::<T>().map_err(|_| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            format!("invalid {what} id '{s}'"),
        )
    })
}
