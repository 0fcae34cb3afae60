use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Create routes for the categories feature
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/api/categories/active", get(handlers::list_active_categories))
        .route("/api/categories/tree", get(handlers::get_category_tree))
        .route("/api/categories/root", get(handlers::list_root_categories))
        .route(
            "/api/categories/statistics",
            get(handlers::get_category_statistics),
        )
        .route(
            "/api/categories/slug-available",
            get(handlers::check_slug_available),
        )
        .route(
            "/api/categories/generate-slug",
            get(handlers::generate_category_slug),
        )
        .route(
            "/api/categories/by-slug/{slug}",
            get(handlers::get_category_by_slug),
        )
        .route(
            "/api/categories/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route(
            "/api/categories/{id}/children",
            get(handlers::list_child_categories),
        )
        .route("/api/categories/{id}/path", get(handlers::get_category_path))
        .route("/api/categories/{id}/move", post(handlers::move_category))
        .route(
            "/api/categories/{id}/activate",
            post(handlers::activate_category),
        )
        .route(
            "/api/categories/{id}/deactivate",
            post(handlers::deactivate_category),
        )
        .with_state(service)
}
