use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::slugs::{dtos as slugs_dtos, handlers as slugs_handlers};
use crate::shared::slug::SlugNamespace;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Categories
        categories_handlers::list_categories,
        categories_handlers::list_active_categories,
        categories_handlers::get_category_tree,
        categories_handlers::list_root_categories,
        categories_handlers::list_child_categories,
        categories_handlers::get_category,
        categories_handlers::get_category_by_slug,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        categories_handlers::move_category,
        categories_handlers::activate_category,
        categories_handlers::deactivate_category,
        categories_handlers::get_category_path,
        categories_handlers::check_slug_available,
        categories_handlers::generate_category_slug,
        categories_handlers::get_category_statistics,
        // Slugs
        slugs_handlers::generate_slug,
        slugs_handlers::check_slug_available,
    ),
    components(
        schemas(
            // Shared
            Meta,
            SlugNamespace,
            // Categories
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            categories_dtos::MoveCategoryDto,
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryBriefDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::CategoryPathDto,
            categories_dtos::CategoryStatisticsDto,
            categories_dtos::SlugAvailabilityDto,
            categories_dtos::GeneratedSlugDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<Vec<categories_dtos::CategoryBriefDto>>,
            ApiResponse<Vec<categories_dtos::CategoryTreeDto>>,
            ApiResponse<categories_dtos::CategoryPathDto>,
            ApiResponse<categories_dtos::CategoryStatisticsDto>,
            ApiResponse<categories_dtos::SlugAvailabilityDto>,
            ApiResponse<categories_dtos::GeneratedSlugDto>,
            // Slugs
            slugs_dtos::NamespacedSlugDto,
            slugs_dtos::NamespacedSlugAvailabilityDto,
            ApiResponse<slugs_dtos::NamespacedSlugDto>,
            ApiResponse<slugs_dtos::NamespacedSlugAvailabilityDto>,
        )
    ),
    tags(
        (name = "categories", description = "Blog category hierarchy"),
        (name = "slugs", description = "Slug generation and availability per namespace"),
    ),
    info(
        title = "Blog CMS API",
        version = "0.1.0",
        description = "API documentation for the blog CMS",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_category_and_slug_paths() {
        let openapi = ApiDoc::openapi();
        let paths = &openapi.paths.paths;

        assert!(paths.contains_key("/api/categories"));
        assert!(paths.contains_key("/api/categories/{id}/move"));
        assert!(paths.contains_key("/api/slugs/generate"));
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut openapi = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Staging".to_string(),
            version: "9.9.9".to_string(),
            description: "staging docs".to_string(),
        }
        .modify(&mut openapi);

        assert_eq!(openapi.info.title, "Staging");
        assert_eq!(openapi.info.description.as_deref(), Some("staging docs"));
    }
}
