use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::context::ActorContext;

/// Header naming the staff member performing the request.
pub const ACTOR_HEADER: &str = "x-actor";

pub async fn actor_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let actor = extract_actor(req.headers())?;

    req.extensions_mut().insert(ActorContext::new(actor));

    Ok(next.run(req).await)
}

fn extract_actor(headers: &HeaderMap) -> Result<String, StatusCode> {
    let header = headers.get(ACTOR_HEADER).ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let actor = header.trim();
    if actor.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(actor.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_actor_header_is_unauthorized() {
        let headers = HeaderMap::new();
        assert_eq!(extract_actor(&headers), Err(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn blank_actor_header_is_unauthorized() {
        let mut headers = HeaderMap::new();
        headers.insert(ACTOR_HEADER, HeaderValue::from_static("   "));
        assert_eq!(extract_actor(&headers), Err(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn actor_header_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(ACTOR_HEADER, HeaderValue::from_static(" amira "));
        assert_eq!(extract_actor(&headers).as_deref(), Ok("amira"));
    }
}
