//! `X-API-Key` authentication middleware.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Reject requests without a valid API key.
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn require_api_key(req: Request<axum::body::Body>, next: Next) -> Response {
    match check(&req) {
        Ok(()) => next.run(req).await,
        Err(err) => err.into_response(),
    }
}

fn check(req: &Request<axum::body::Body>) -> Result<(), ApiError> {
    let ctx = req
        .extensions()
        .get::<ApiContext>()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    let Some(presented) = presented else {
        tracing::warn!(path = %req.uri().path(), "API key validation failed: missing header");
        return Err(ApiError::MissingApiKey);
    };

    if !ctx.verify_api_key(presented) {
        tracing::warn!(path = %req.uri().path(), "API key validation failed: invalid key");
        return Err(ApiError::InvalidApiKey);
    }
    Ok(())
}
