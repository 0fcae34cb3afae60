use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::slugs::handlers;
use crate::features::slugs::services::SlugService;

/// Create routes for slug helpers shared by categories, posts and tags
pub fn routes(service: Arc<SlugService>) -> Router {
    Router::new()
        .route("/api/slugs/generate", get(handlers::generate_slug))
        .route("/api/slugs/available", get(handlers::check_slug_available))
        .with_state(service)
}
