use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::AppQuery;
use crate::features::slugs::dtos::{
    NamespacedSlugAvailabilityDto, NamespacedSlugDto, SlugAvailabilityParams, SlugGenerateParams,
};
use crate::features::slugs::services::SlugService;
use crate::shared::types::ApiResponse;

/// Generate an unused slug in a namespace
#[utoipa::path(
    get,
    path = "/api/slugs/generate",
    params(SlugGenerateParams),
    responses(
        (status = 200, description = "Generated slug", body = ApiResponse<NamespacedSlugDto>),
        (status = 400, description = "Unknown namespace or missing name")
    ),
    tag = "slugs"
)]
pub async fn generate_slug(
    State(service): State<Arc<SlugService>>,
    AppQuery(params): AppQuery<SlugGenerateParams>,
) -> Result<Json<ApiResponse<NamespacedSlugDto>>> {
    let slug = service.generate(params.namespace, &params.name).await?;
    Ok(Json(ApiResponse::success(Some(slug), None, None)))
}

/// Check whether a slug is free in a namespace
#[utoipa::path(
    get,
    path = "/api/slugs/available",
    params(SlugAvailabilityParams),
    responses(
        (status = 200, description = "Slug availability", body = ApiResponse<NamespacedSlugAvailabilityDto>),
        (status = 400, description = "Unknown namespace or missing slug")
    ),
    tag = "slugs"
)]
pub async fn check_slug_available(
    State(service): State<Arc<SlugService>>,
    AppQuery(params): AppQuery<SlugAvailabilityParams>,
) -> Result<Json<ApiResponse<NamespacedSlugAvailabilityDto>>> {
    let availability = service
        .check_available(params.namespace, &params.slug, params.exclude_id)
        .await?;
    Ok(Json(ApiResponse::success(Some(availability), None, None)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use std::sync::Arc;
    use axum_test::TestServer;
    use serde_json::Value;
    use uuid::Uuid;

    use crate::core::config::CategoryConfig;
    use crate::features::slugs::repositories::InMemorySlugLookup;
    use crate::features::slugs::routes;
    use crate::features::slugs::services::SlugService;
    use crate::shared::slug::SlugNamespace;

    async fn test_server() -> TestServer {
        let lookup = Arc::new(InMemorySlugLookup::new());
        lookup
            .insert(SlugNamespace::Posts, Uuid::new_v4(), "release-notes")
            .await;
        let service = SlugService::new(lookup, &CategoryConfig::default());
        TestServer::new(routes::routes(Arc::new(service))).unwrap()
    }

    #[tokio::test]
    async fn test_generate_in_namespace() {
        let server = test_server().await;

        let response = server
            .get("/api/slugs/generate")
            .add_query_param("namespace", "posts")
            .add_query_param("name", "Release Notes")
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body = response.json::<Value>();
        assert_eq!(body["data"]["slug"], "release-notes-1");
        assert_eq!(body["data"]["namespace"], "posts");
    }

    #[tokio::test]
    async fn test_available_and_unknown_namespace() {
        let server = test_server().await;

        let body = server
            .get("/api/slugs/available")
            .add_query_param("namespace", "tags")
            .add_query_param("slug", "release-notes")
            .await
            .json::<Value>();
        assert_eq!(body["data"]["available"], true);

        let response = server
            .get("/api/slugs/available")
            .add_query_param("namespace", "pages")
            .add_query_param("slug", "anything")
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }
}
