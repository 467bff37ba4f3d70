//! Router configuration for the Web API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{upload_files, AppState};
use crate::upload::UploadPolicy;

/// Room for multipart boundaries and part headers on top of file content.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let body_limit = request_body_limit(app_state.storage.policy());

    let api_routes = Router::new().route(
        "/uploads",
        post(upload_files).layer(DefaultBodyLimit::max(body_limit)),
    );

    Router::new()
        .nest("/api", api_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}

/// Largest request body the upload route reads.
///
/// Per-file limits are enforced while streaming; this only bounds the
/// request as a whole.
pub fn request_body_limit(policy: &UploadPolicy) -> usize {
    let total = policy
        .max_file_size()
        .saturating_mul(policy.max_files() as u64)
        .saturating_add(MULTIPART_OVERHEAD);
    usize::try_from(total).unwrap_or(usize::MAX)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
