use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::config::CategoryConfig;
use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategoryBriefDto, CategoryPathDto, CategoryQueryParams, CategoryResponseDto,
    CategoryStatisticsDto, CategoryTreeDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::models::{Category, CategoryTreeNode};
use crate::features::categories::repositories::CategoryRepository;
use crate::features::posts::PostCounter;
use crate::shared::constants::TOP_CATEGORIES_BY_POSTS;
use crate::shared::slug::SlugGenerator;

/// Service for category operations.
///
/// All validation happens before the first write. Mutations are serialized
/// through `write_lock` so that read-then-write checks (slug taken, cycle)
/// cannot interleave within this process; the repository re-checks them
/// atomically against the store.
pub struct CategoryService {
    repository: Arc<dyn CategoryRepository>,
    post_counter: Arc<dyn PostCounter>,
    slug_generator: SlugGenerator,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for CategoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryService")
            .field("slug_generator", &self.slug_generator)
            .finish()
    }
}

impl CategoryService {
    pub fn new(
        repository: Arc<dyn CategoryRepository>,
        post_counter: Arc<dyn PostCounter>,
        config: &CategoryConfig,
    ) -> Self {
        Self {
            repository,
            post_counter,
            slug_generator: SlugGenerator::new(config.empty_slug_fallback.clone()),
            write_lock: Mutex::new(()),
        }
    }

    async fn post_counts(&self, categories: &[Category]) -> Result<HashMap<Uuid, i64>> {
        let ids: Vec<Uuid> = categories.iter().map(|c| c.id).collect();
        self.post_counter.count_posts_by_categories(&ids).await
    }

    async fn to_briefs(&self, categories: Vec<Category>) -> Result<Vec<CategoryBriefDto>> {
        let counts = self.post_counts(&categories).await?;
        Ok(categories
            .into_iter()
            .map(|c| {
                let count = counts.get(&c.id).copied().unwrap_or(0);
                CategoryBriefDto::from_category(c, count)
            })
            .collect())
    }

    async fn to_response(&self, category: Category) -> Result<CategoryResponseDto> {
        let post_count = self.post_counter.count_posts_by_category(category.id).await?;
        Ok(CategoryResponseDto::from_category(category, post_count))
    }

    async fn ensure_slug_free(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<()> {
        if self.repository.slug_exists(slug, exclude_id).await? {
            return Err(AppError::Conflict(format!("Slug '{}' already exists", slug)));
        }
        Ok(())
    }

    /// Parent checks shared by update and move: not self, exists, no cycle
    async fn validate_new_parent(&self, id: Uuid, parent_id: Uuid) -> Result<()> {
        if parent_id == id {
            return Err(AppError::Conflict(format!(
                "Category {} cannot be its own parent",
                id
            )));
        }

        if self.repository.find(parent_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Parent category with id {} not found",
                parent_id
            )));
        }

        if self.repository.would_create_cycle(id, parent_id).await? {
            return Err(AppError::Conflict(format!(
                "Setting parent {} on category {} would create a circular reference",
                parent_id, id
            )));
        }

        Ok(())
    }

    /// List categories (paged, filtered)
    pub async fn list(
        &self,
        params: &CategoryQueryParams,
    ) -> Result<(Vec<CategoryResponseDto>, i64)> {
        let parent_ids = match params.parent_id {
            Some(parent_id) if params.include_children => {
                let mut ids = vec![parent_id];
                ids.extend(self.repository.get_descendant_ids(parent_id).await?);
                Some(ids)
            }
            Some(parent_id) => Some(vec![parent_id]),
            None => None,
        };

        let (categories, total) = self
            .repository
            .list_paged(&params.to_filter(parent_ids))
            .await?;
        let counts = self.post_counts(&categories).await?;

        let items = categories
            .into_iter()
            .map(|c| {
                let count = counts.get(&c.id).copied().unwrap_or(0);
                CategoryResponseDto::from_category(c, count)
            })
            .collect();
        Ok((items, total))
    }

    /// All active categories as a flat list
    pub async fn list_active(&self) -> Result<Vec<CategoryBriefDto>> {
        let categories = self.repository.list_all(true).await?;
        self.to_briefs(categories).await
    }

    /// Category forest with post counts on every node
    pub async fn get_tree(&self, only_active: bool) -> Result<Vec<CategoryTreeDto>> {
        let forest = self.repository.build_tree(only_active).await?;

        let ids: Vec<Uuid> = forest
            .iter()
            .flat_map(CategoryTreeNode::iter)
            .map(|node| node.category.id)
            .collect();
        let counts = self.post_counter.count_posts_by_categories(&ids).await?;

        Ok(forest
            .into_iter()
            .map(|node| CategoryTreeDto::from_node(node, &counts))
            .collect())
    }

    pub async fn get_roots(&self, only_active: bool) -> Result<Vec<CategoryBriefDto>> {
        let roots = self.repository.get_roots(only_active).await?;
        self.to_briefs(roots).await
    }

    pub async fn get_children(
        &self,
        parent_id: Uuid,
        only_active: bool,
    ) -> Result<Vec<CategoryBriefDto>> {
        self.repository.get(parent_id).await?;
        let children = self.repository.get_children(parent_id, only_active).await?;
        self.to_briefs(children).await
    }

    pub async fn get(&self, id: Uuid) -> Result<CategoryResponseDto> {
        let category = self.repository.get(id).await?;
        self.to_response(category).await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryResponseDto> {
        let category = self
            .repository
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", slug)))?;
        self.to_response(category).await
    }

    /// Create a new category. A missing slug is generated from the name.
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let _guard = self.write_lock.lock().await;

        let slug = match dto.slug {
            Some(ref slug) => {
                self.ensure_slug_free(slug, None).await?;
                slug.clone()
            }
            None => self.generate_slug(&dto.name).await?,
        };

        if let Some(parent_id) = dto.parent_id {
            if self.repository.find(parent_id).await?.is_none() {
                return Err(AppError::NotFound(format!(
                    "Parent category with id {} not found",
                    parent_id
                )));
            }
        }

        let mut category = Category::new(Uuid::now_v7(), &dto.name, &slug, dto.parent_id)?;
        category.update_basic_info(&dto.name, &slug, dto.description)?;
        category.sort_order = dto.sort_order;
        category.set_display_style(dto.icon, dto.color);
        category.update_seo_info(dto.meta_keywords, dto.meta_description);
        if !dto.is_active {
            category.disable();
        }

        let category = self.repository.insert(category).await?;
        tracing::info!("Category created: id={}, slug={}", category.id, category.slug);

        self.to_response(category).await
    }

    /// Replace a category's fields, including its parent
    pub async fn update(&self, id: Uuid, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        let _guard = self.write_lock.lock().await;

        let mut category = self.repository.get(id).await?;

        if category.slug != dto.slug {
            self.ensure_slug_free(&dto.slug, Some(id)).await?;
        }

        if let Some(parent_id) = dto.parent_id {
            self.validate_new_parent(id, parent_id).await?;
        }

        category.update_basic_info(&dto.name, &dto.slug, dto.description)?;
        category.set_parent(dto.parent_id)?;
        category.sort_order = dto.sort_order;
        category.set_display_style(dto.icon, dto.color);
        category.update_seo_info(dto.meta_keywords, dto.meta_description);
        if dto.is_active {
            category.enable();
        } else {
            category.disable();
        }

        let category = self.repository.update(category).await?;
        tracing::info!("Category updated: id={}, slug={}", category.id, category.slug);

        self.to_response(category).await
    }

    /// Reattach a category under `new_parent_id`, or make it a root
    pub async fn move_category(
        &self,
        id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> Result<CategoryResponseDto> {
        let _guard = self.write_lock.lock().await;

        let mut category = self.repository.get(id).await?;

        if let Some(parent_id) = new_parent_id {
            self.validate_new_parent(id, parent_id).await?;
        }

        category.set_parent(new_parent_id)?;
        let category = self.repository.update(category).await?;
        tracing::info!(
            "Category moved: id={}, parent_id={:?}",
            category.id,
            category.parent_id
        );

        self.to_response(category).await
    }

    /// Soft-delete a category without children or posts
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let category = self.repository.get(id).await?;

        if self.repository.has_children(id).await? {
            return Err(AppError::Conflict(format!(
                "Cannot delete category {} because it has child categories",
                id
            )));
        }

        let post_count = self.post_counter.count_posts_by_category(id).await?;
        if post_count > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete category {} because it has {} associated posts",
                id, post_count
            )));
        }

        self.repository.delete(&category).await?;
        tracing::info!("Category deleted: id={}, slug={}", category.id, category.slug);

        Ok(())
    }

    pub async fn activate(&self, id: Uuid) -> Result<CategoryResponseDto> {
        self.set_active(id, true).await
    }

    pub async fn deactivate(&self, id: Uuid) -> Result<CategoryResponseDto> {
        self.set_active(id, false).await
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<CategoryResponseDto> {
        let _guard = self.write_lock.lock().await;

        let mut category = self.repository.get(id).await?;
        if active {
            category.enable();
        } else {
            category.disable();
        }

        let category = self.repository.update(category).await?;
        tracing::info!("Category {}: id={}", if active { "activated" } else { "deactivated" }, id);

        self.to_response(category).await
    }

    /// Ancestor chain of a category, root first
    pub async fn get_path(&self, id: Uuid) -> Result<CategoryPathDto> {
        self.repository.get(id).await?;
        let path = self.repository.get_path(id).await?;
        Ok(CategoryPathDto::new(self.to_briefs(path).await?))
    }

    pub async fn is_slug_available(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool> {
        Ok(!self.repository.slug_exists(slug, exclude_id).await?)
    }

    /// Unused slug derived from `name` in the category namespace
    pub async fn generate_slug(&self, name: &str) -> Result<String> {
        let repository = Arc::clone(&self.repository);
        self.slug_generator
            .generate_async(name, move |candidate| {
                let repository = Arc::clone(&repository);
                async move { repository.slug_exists(&candidate, None).await }
            })
            .await
    }

    pub async fn statistics(&self) -> Result<CategoryStatisticsDto> {
        let categories = self.repository.list_all(false).await?;

        let total_count = categories.len() as i64;
        let active_count = categories.iter().filter(|c| c.is_active).count() as i64;
        let root_category_count = categories.iter().filter(|c| c.is_root()).count() as i64;

        let mut ranked = self.to_briefs(categories).await?;
        ranked.retain(|c| c.post_count > 0);
        ranked.sort_by(|a, b| {
            b.post_count
                .cmp(&a.post_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        ranked.truncate(TOP_CATEGORIES_BY_POSTS);

        Ok(CategoryStatisticsDto {
            total_count,
            active_count,
            inactive_count: total_count - active_count,
            root_category_count,
            categories_with_most_posts: ranked,
        })
    }
}
