//! API router.
//!
//! Middleware stack (outermost → innermost):
//! 1. Extension(ApiContext) → 2. Access log → 3. API-key auth → handler

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the service router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    let summaries = Router::new()
        .route("/summaries/initial", post(endpoints::summaries::create_initial))
        .route(
            "/summaries/:profile_id",
            get(endpoints::summaries::get).delete(endpoints::summaries::delete),
        )
        .route(
            "/summaries/:profile_id/documents",
            post(endpoints::summaries::update_from_document),
        )
        .route(
            "/summaries/:profile_id/chat-sessions",
            post(endpoints::summaries::update_from_chat_session),
        )
        .route(
            "/summaries/:profile_id/transcriptions",
            post(endpoints::summaries::update_from_transcription),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let transcription = Router::new()
        .route("/transcribe", post(endpoints::transcribe::transcribe))
        .layer(DefaultBodyLimit::max(endpoints::transcribe::MAX_AUDIO_BYTES));

    let protected = Router::new()
        .merge(summaries)
        .merge(transcription)
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_api_key));

    let open = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx.clone());

    Router::new()
        .merge(protected)
        .merge(open)
        .layer(axum::middleware::from_fn(middleware::access_log::log_access))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx))
}
