use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::{Category, CategoryTreeNode};
use crate::features::categories::repositories::CategoryFilter;
use crate::shared::constants::CATEGORY_PATH_SEPARATOR;
use crate::shared::types::{default_page, default_page_size, PaginationQuery};
use crate::shared::validation::{COLOR_REGEX, SLUG_REGEX};

fn default_true() -> bool {
    true
}

/// Query params for listing categories with pagination and filters
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,

    /// Search in name, slug or description
    pub keyword: Option<String>,

    /// Only children of this category
    pub parent_id: Option<Uuid>,

    /// With `parent_id`: include all descendants, not only direct children
    #[serde(default)]
    pub include_children: bool,

    /// Filter by active status (none = all)
    pub is_active: Option<bool>,
}

impl CategoryQueryParams {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }

    /// Repository filter; `parent_ids` is resolved by the caller
    pub fn to_filter(&self, parent_ids: Option<Vec<Uuid>>) -> CategoryFilter {
        let pagination = self.pagination();
        CategoryFilter {
            keyword: self.keyword.clone(),
            parent_ids,
            is_active: self.is_active,
            offset: pagination.offset(),
            limit: pagination.limit(),
        }
    }
}

impl Default for CategoryQueryParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            keyword: None,
            parent_id: None,
            include_children: false,
            is_active: None,
        }
    }
}

/// Query params for tree/root/children listings
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OnlyActiveQuery {
    /// Hide inactive categories (default: true)
    #[serde(default = "default_true")]
    pub only_active: bool,
}

/// Query params for slug availability checks
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlugAvailabilityQuery {
    pub slug: String,
    /// Category allowed to already own the slug (when editing it)
    pub exclude_id: Option<Uuid>,
}

/// Query params for slug generation
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GenerateSlugQuery {
    /// Display name to derive the slug from
    pub name: String,
}

/// Create request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    /// Generated from `name` when omitted
    #[validate(length(min = 1, max = 100), regex(path = *SLUG_REGEX, message = "slug must be lowercase kebab-case (e.g., 'rust-tips')"))]
    pub slug: Option<String>,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    pub parent_id: Option<Uuid>,

    #[serde(default)]
    pub sort_order: i32,

    #[validate(length(max = 100))]
    pub icon: Option<String>,

    #[validate(length(max = 20), regex(path = *COLOR_REGEX, message = "color must be a hex value like '#1e90ff'"))]
    pub color: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[validate(length(max = 200))]
    pub meta_keywords: Option<String>,

    #[validate(length(max = 300))]
    pub meta_description: Option<String>,
}

impl CreateCategoryDto {
    pub fn new(name: impl Into<String>, slug: Option<String>, parent_id: Option<Uuid>) -> Self {
        Self {
            name: name.into(),
            slug,
            description: None,
            parent_id,
            sort_order: 0,
            icon: None,
            color: None,
            is_active: true,
            meta_keywords: None,
            meta_description: None,
        }
    }
}

/// Update request. Replaces every field; a missing `parent_id` makes the
/// category a root.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 100), regex(path = *SLUG_REGEX, message = "slug must be lowercase kebab-case (e.g., 'rust-tips')"))]
    pub slug: String,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    pub parent_id: Option<Uuid>,

    #[serde(default)]
    pub sort_order: i32,

    #[validate(length(max = 100))]
    pub icon: Option<String>,

    #[validate(length(max = 20), regex(path = *COLOR_REGEX, message = "color must be a hex value like '#1e90ff'"))]
    pub color: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[validate(length(max = 200))]
    pub meta_keywords: Option<String>,

    #[validate(length(max = 300))]
    pub meta_description: Option<String>,
}

impl UpdateCategoryDto {
    /// Request that keeps every field of `category` as it is
    pub fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            parent_id: category.parent_id,
            sort_order: category.sort_order,
            icon: category.icon.clone(),
            color: category.color.clone(),
            is_active: category.is_active,
            meta_keywords: category.meta_keywords.clone(),
            meta_description: category.meta_description.clone(),
        }
    }
}

/// Move request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MoveCategoryDto {
    /// New parent; null moves the category to the root level. The field
    /// itself is required.
    #[serde(deserialize_with = "deserialize_present_nullable")]
    #[schema(required = true)]
    pub new_parent_id: Option<Uuid>,
}

/// Accepts `null` as `None` while leaving a missing key a "missing field"
/// error, which the plain `Option` derive would turn into `None`.
fn deserialize_present_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub meta_keywords: Option<String>,
    pub meta_description: Option<String>,
    pub post_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategoryResponseDto {
    pub fn from_category(c: Category, post_count: i64) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            icon: c.icon,
            color: c.color,
            sort_order: c.sort_order,
            is_active: c.is_active,
            meta_keywords: c.meta_keywords,
            meta_description: c.meta_description,
            post_count,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Compact category view for lists and paths
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryBriefDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
    pub post_count: i64,
}

impl CategoryBriefDto {
    pub fn from_category(c: Category, post_count: i64) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name,
            slug: c.slug,
            icon: c.icon,
            color: c.color,
            is_active: c.is_active,
            post_count,
        }
    }
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub post_count: i64,
    pub children: Vec<CategoryTreeDto>,
}

impl CategoryTreeDto {
    /// Convert a tree, looking up post counts by category id (missing = 0)
    pub fn from_node(node: CategoryTreeNode, post_counts: &HashMap<Uuid, i64>) -> Self {
        let CategoryTreeNode { category, children } = node;
        Self {
            post_count: post_counts.get(&category.id).copied().unwrap_or(0),
            id: category.id,
            parent_id: category.parent_id,
            name: category.name,
            slug: category.slug,
            icon: category.icon,
            color: category.color,
            sort_order: category.sort_order,
            is_active: category.is_active,
            children: children
                .into_iter()
                .map(|child| Self::from_node(child, post_counts))
                .collect(),
        }
    }
}

/// Ancestor path of a category, root first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryPathDto {
    pub items: Vec<CategoryBriefDto>,
    /// Names joined with " > ", e.g. "Programming > Rust > Async"
    pub full_path: String,
}

impl CategoryPathDto {
    pub fn new(items: Vec<CategoryBriefDto>) -> Self {
        let full_path = items
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(CATEGORY_PATH_SEPARATOR);
        Self { items, full_path }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlugAvailabilityDto {
    pub slug: String,
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeneratedSlugDto {
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryStatisticsDto {
    pub total_count: i64,
    pub active_count: i64,
    pub inactive_count: i64,
    pub root_category_count: i64,
    pub categories_with_most_posts: Vec<CategoryBriefDto>,
}
