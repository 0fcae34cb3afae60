use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;
use crate::features::categories::repositories::{CategoryFilter, CategoryRepository};
use crate::features::posts::PostCounter;

/// Arena of categories keyed by id, with per-category post counts.
/// Mirrors the checks `PgCategoryRepository` performs inside its transactions.
#[derive(Debug, Default)]
pub struct InMemoryCategoryRepository {
    categories: RwLock<HashMap<Uuid, Category>>,
    post_counts: RwLock<HashMap<Uuid, i64>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_post_count(&self, category_id: Uuid, count: i64) {
        self.post_counts.write().await.insert(category_id, count);
    }

    /// Raw row including soft-deleted ones
    pub async fn raw(&self, id: Uuid) -> Option<Category> {
        self.categories.read().await.get(&id).cloned()
    }

    /// Overwrite a row without any checks, for corrupt-data scenarios
    pub async fn put_unchecked(&self, category: Category) {
        self.categories.write().await.insert(category.id, category);
    }

    fn live_sorted<'a>(
        categories: impl Iterator<Item = &'a Category>,
        predicate: impl Fn(&Category) -> bool,
    ) -> Vec<Category> {
        let mut matched: Vec<Category> = categories
            .filter(|c| !c.is_deleted() && predicate(c))
            .cloned()
            .collect();
        matched.sort_by(Category::sibling_order);
        matched
    }

    fn closes_cycle(categories: &HashMap<Uuid, Category>, category_id: Uuid, parent_id: Uuid) -> bool {
        let mut current = Some(parent_id);
        let mut steps = 0;
        while let Some(id) = current {
            if id == category_id || steps > categories.len() {
                return true;
            }
            current = categories
                .get(&id)
                .filter(|c| !c.is_deleted())
                .and_then(|c| c.parent_id);
            steps += 1;
        }
        false
    }
}

fn live_slug_taken(categories: &HashMap<Uuid, Category>, slug: &str, exclude_id: Option<Uuid>) -> bool {
    categories
        .values()
        .any(|c| !c.is_deleted() && c.slug == slug && Some(c.id) != exclude_id)
}

fn ensure_live_parent(categories: &HashMap<Uuid, Category>, parent_id: Option<Uuid>) -> Result<()> {
    match parent_id {
        Some(parent_id) if !categories.get(&parent_id).is_some_and(|p| !p.is_deleted()) => Err(
            AppError::NotFound(format!("Parent category with id {} not found", parent_id)),
        ),
        _ => Ok(()),
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find(&self, id: Uuid) -> Result<Option<Category>> {
        Ok(self
            .categories
            .read()
            .await
            .get(&id)
            .filter(|c| !c.is_deleted())
            .cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        Ok(self
            .categories
            .read()
            .await
            .values()
            .find(|c| !c.is_deleted() && c.slug == slug)
            .cloned())
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool> {
        Ok(live_slug_taken(&*self.categories.read().await, slug, exclude_id))
    }

    async fn insert(&self, category: Category) -> Result<Category> {
        let mut categories = self.categories.write().await;
        if live_slug_taken(&categories, &category.slug, None) {
            return Err(AppError::Conflict(format!(
                "Slug '{}' already exists",
                category.slug
            )));
        }
        ensure_live_parent(&categories, category.parent_id)?;
        if categories.contains_key(&category.id) {
            return Err(AppError::Conflict(format!(
                "Category with id {} already exists",
                category.id
            )));
        }
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, mut category: Category) -> Result<Category> {
        let mut categories = self.categories.write().await;
        if !categories.get(&category.id).is_some_and(|c| !c.is_deleted()) {
            return Err(AppError::NotFound(format!(
                "Category with id {} not found",
                category.id
            )));
        }
        if live_slug_taken(&categories, &category.slug, Some(category.id)) {
            return Err(AppError::Conflict(format!(
                "Slug '{}' already exists",
                category.slug
            )));
        }
        ensure_live_parent(&categories, category.parent_id)?;
        if let Some(parent_id) = category.parent_id {
            if Self::closes_cycle(&categories, category.id, parent_id) {
                return Err(AppError::Conflict(format!(
                    "Setting parent {} on category {} would create a circular reference",
                    parent_id, category.id
                )));
            }
        }

        category.touch();
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, category: &Category) -> Result<()> {
        let mut categories = self.categories.write().await;
        let children = categories
            .values()
            .filter(|c| !c.is_deleted() && c.parent_id == Some(category.id))
            .count();
        if children > 0 {
            return Err(AppError::Conflict(format!(
                "Category {} still has {} child categories",
                category.id, children
            )));
        }
        let posts = self.count_posts_by_category(category.id).await?;
        if posts > 0 {
            return Err(AppError::Conflict(format!(
                "Category {} still has {} associated posts",
                category.id, posts
            )));
        }

        match categories.get_mut(&category.id) {
            Some(stored) if !stored.is_deleted() => {
                stored.mark_deleted();
                Ok(())
            }
            _ => Err(AppError::NotFound(format!(
                "Category with id {} not found",
                category.id
            ))),
        }
    }

    async fn list_all(&self, only_active: bool) -> Result<Vec<Category>> {
        let categories = self.categories.read().await;
        Ok(Self::live_sorted(categories.values(), |c| {
            !only_active || c.is_active
        }))
    }

    async fn list_paged(&self, filter: &CategoryFilter) -> Result<(Vec<Category>, i64)> {
        let keyword = filter
            .keyword
            .as_ref()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty());

        let categories = self.categories.read().await;
        let matched = Self::live_sorted(categories.values(), |c| {
            let keyword_match = keyword.as_ref().map_or(true, |k| {
                c.name.to_lowercase().contains(k)
                    || c.slug.contains(k)
                    || c
                        .description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(k))
            });
            let parent_match = filter
                .parent_ids
                .as_ref()
                .map_or(true, |ids| c.parent_id.is_some_and(|p| ids.contains(&p)));
            let active_match = filter.is_active.map_or(true, |a| c.is_active == a);
            keyword_match && parent_match && active_match
        });

        let total = matched.len() as i64;
        let page = matched
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn get_children(&self, parent_id: Uuid, only_active: bool) -> Result<Vec<Category>> {
        let categories = self.categories.read().await;
        Ok(Self::live_sorted(categories.values(), |c| {
            c.parent_id == Some(parent_id) && (!only_active || c.is_active)
        }))
    }

    async fn get_roots(&self, only_active: bool) -> Result<Vec<Category>> {
        let categories = self.categories.read().await;
        Ok(Self::live_sorted(categories.values(), |c| {
            c.is_root() && (!only_active || c.is_active)
        }))
    }
}

#[async_trait]
impl PostCounter for InMemoryCategoryRepository {
    async fn count_posts_by_category(&self, category_id: Uuid) -> Result<i64> {
        Ok(self
            .post_counts
            .read()
            .await
            .get(&category_id)
            .copied()
            .unwrap_or(0))
    }
}
