use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppQuery};
use crate::features::categories::dtos::{
    CategoryBriefDto, CategoryPathDto, CategoryQueryParams, CategoryResponseDto,
    CategoryStatisticsDto, CategoryTreeDto, CreateCategoryDto, GenerateSlugQuery,
    GeneratedSlugDto, MoveCategoryDto, OnlyActiveQuery, SlugAvailabilityDto,
    SlugAvailabilityQuery, UpdateCategoryDto,
};
use crate::features::categories::services::CategoryService;
use crate::shared::types::{ApiResponse, Meta};

/// List categories with pagination and filters
#[utoipa::path(
    get,
    path = "/api/categories",
    params(CategoryQueryParams),
    responses(
        (status = 200, description = "Categories retrieved successfully", body = ApiResponse<Vec<CategoryResponseDto>>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    AppQuery(params): AppQuery<CategoryQueryParams>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let (categories, total) = service.list(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta { total }),
    )))
}

/// List all active categories
#[utoipa::path(
    get,
    path = "/api/categories/active",
    responses(
        (status = 200, description = "Active categories", body = ApiResponse<Vec<CategoryBriefDto>>),
    ),
    tag = "categories"
)]
pub async fn list_active_categories(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<ApiResponse<Vec<CategoryBriefDto>>>> {
    let categories = service.list_active().await?;
    Ok(Json(ApiResponse::success(Some(categories), None, None)))
}

/// Get the category tree
#[utoipa::path(
    get,
    path = "/api/categories/tree",
    params(OnlyActiveQuery),
    responses(
        (status = 200, description = "Category forest, roots first", body = ApiResponse<Vec<CategoryTreeDto>>),
    ),
    tag = "categories"
)]
pub async fn get_category_tree(
    State(service): State<Arc<CategoryService>>,
    AppQuery(query): AppQuery<OnlyActiveQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryTreeDto>>>> {
    let tree = service.get_tree(query.only_active).await?;
    Ok(Json(ApiResponse::success(Some(tree), None, None)))
}

/// List root categories
#[utoipa::path(
    get,
    path = "/api/categories/root",
    params(OnlyActiveQuery),
    responses(
        (status = 200, description = "Root categories", body = ApiResponse<Vec<CategoryBriefDto>>),
    ),
    tag = "categories"
)]
pub async fn list_root_categories(
    State(service): State<Arc<CategoryService>>,
    AppQuery(query): AppQuery<OnlyActiveQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryBriefDto>>>> {
    let roots = service.get_roots(query.only_active).await?;
    Ok(Json(ApiResponse::success(Some(roots), None, None)))
}

/// List direct children of a category
#[utoipa::path(
    get,
    path = "/api/categories/{id}/children",
    params(
        ("id" = Uuid, Path, description = "Parent category ID"),
        OnlyActiveQuery
    ),
    responses(
        (status = 200, description = "Child categories", body = ApiResponse<Vec<CategoryBriefDto>>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn list_child_categories(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
    AppQuery(query): AppQuery<OnlyActiveQuery>,
) -> Result<Json<ApiResponse<Vec<CategoryBriefDto>>>> {
    let children = service.get_children(id, query.only_active).await?;
    Ok(Json(ApiResponse::success(Some(children), None, None)))
}

/// Get a category by ID
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// Get a category by slug
#[utoipa::path(
    get,
    path = "/api/categories/by-slug/{slug}",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category_by_slug(
    State(service): State<Arc<CategoryService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.get_by_slug(&slug).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created successfully", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Parent category not found"),
        (status = 409, description = "Slug already exists")
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(category),
            Some("Category created successfully".to_string()),
            None,
        )),
    ))
}

/// Update a category
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated successfully", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Category or parent not found"),
        (status = 409, description = "Slug taken, self-parent or circular reference")
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateCategoryDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let category = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(category),
        Some("Category updated successfully".to_string()),
        None,
    )))
}

/// Delete a category (soft delete)
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted successfully"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still has children or posts")
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Category deleted successfully".to_string()),
        None,
    )))
}

/// Move a category under a new parent (null = root)
#[utoipa::path(
    post,
    path = "/api/categories/{id}/move",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = MoveCategoryDto,
    responses(
        (status = 200, description = "Category moved successfully", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Missing new_parent_id"),
        (status = 404, description = "Category or parent not found"),
        (status = 409, description = "Self-parent or circular reference")
    ),
    tag = "categories"
)]
pub async fn move_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<MoveCategoryDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.move_category(id, dto.new_parent_id).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// Activate a category
#[utoipa::path(
    post,
    path = "/api/categories/{id}/activate",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category activated", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn activate_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.activate(id).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// Deactivate a category
#[utoipa::path(
    post,
    path = "/api/categories/{id}/deactivate",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deactivated", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn deactivate_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.deactivate(id).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// Get the ancestor path of a category
#[utoipa::path(
    get,
    path = "/api/categories/{id}/path",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Path from root to the category", body = ApiResponse<CategoryPathDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category_path(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CategoryPathDto>>> {
    let path = service.get_path(id).await?;
    Ok(Json(ApiResponse::success(Some(path), None, None)))
}

/// Check whether a category slug is free
#[utoipa::path(
    get,
    path = "/api/categories/slug-available",
    params(SlugAvailabilityQuery),
    responses(
        (status = 200, description = "Availability of the slug", body = ApiResponse<SlugAvailabilityDto>),
    ),
    tag = "categories"
)]
pub async fn check_slug_available(
    State(service): State<Arc<CategoryService>>,
    AppQuery(query): AppQuery<SlugAvailabilityQuery>,
) -> Result<Json<ApiResponse<SlugAvailabilityDto>>> {
    let available = service
        .is_slug_available(&query.slug, query.exclude_id)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(SlugAvailabilityDto {
            slug: query.slug,
            available,
        }),
        None,
        None,
    )))
}

/// Generate an unused category slug from a name
#[utoipa::path(
    get,
    path = "/api/categories/generate-slug",
    params(GenerateSlugQuery),
    responses(
        (status = 200, description = "Generated slug", body = ApiResponse<GeneratedSlugDto>),
    ),
    tag = "categories"
)]
pub async fn generate_category_slug(
    State(service): State<Arc<CategoryService>>,
    AppQuery(query): AppQuery<GenerateSlugQuery>,
) -> Result<Json<ApiResponse<GeneratedSlugDto>>> {
    let slug = service.generate_slug(&query.name).await?;
    Ok(Json(ApiResponse::success(
        Some(GeneratedSlugDto { slug }),
        None,
        None,
    )))
}

/// Category statistics
#[utoipa::path(
    get,
    path = "/api/categories/statistics",
    responses(
        (status = 200, description = "Category statistics", body = ApiResponse<CategoryStatisticsDto>),
    ),
    tag = "categories"
)]
pub async fn get_category_statistics(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<ApiResponse<CategoryStatisticsDto>>> {
    let statistics = service.statistics().await?;
    Ok(Json(ApiResponse::success(Some(statistics), None, None)))
}
