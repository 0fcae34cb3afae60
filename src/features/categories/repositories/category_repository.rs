use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{build_forest, Category, CategoryTreeNode};

/// Filters for paged category listings
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    /// Case-insensitive match on name, slug or description
    pub keyword: Option<String>,
    /// Restrict to children of any of these parents
    pub parent_ids: Option<Vec<Uuid>>,
    pub is_active: Option<bool>,
    pub offset: i64,
    pub limit: i64,
}

/// Persistence and structural-integrity gate for the category forest.
///
/// Soft-deleted categories are invisible to every method. Listings are
/// ordered by `(sort_order, name)`.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Category>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// True if a live category other than `exclude_id` uses `slug`
    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool>;

    /// Persist a new category. Fails with `Conflict` on a taken slug.
    async fn insert(&self, category: Category) -> Result<Category>;

    /// Persist changed fields. Fails with `Conflict` on a taken slug or when the
    /// new parent would close a cycle.
    async fn update(&self, category: Category) -> Result<Category>;

    /// Soft-delete. Fails with `Conflict` while live children or posts exist.
    async fn delete(&self, category: &Category) -> Result<()>;

    async fn list_all(&self, only_active: bool) -> Result<Vec<Category>>;

    async fn list_paged(&self, filter: &CategoryFilter) -> Result<(Vec<Category>, i64)>;

    async fn get_children(&self, parent_id: Uuid, only_active: bool) -> Result<Vec<Category>>;

    async fn get_roots(&self, only_active: bool) -> Result<Vec<Category>>;

    async fn get(&self, id: Uuid) -> Result<Category> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    async fn has_children(&self, id: Uuid) -> Result<bool> {
        Ok(!self.get_children(id, false).await?.is_empty())
    }

    /// Ancestor chain of `id`, root first and ending with `id` itself.
    /// Stops quietly at a missing parent; empty if `id` does not exist.
    async fn get_path(&self, id: Uuid) -> Result<Vec<Category>> {
        let mut path = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(id);

        while let Some(current_id) = current {
            if !seen.insert(current_id) {
                tracing::warn!("Parent loop detected at category {}", current_id);
                break;
            }
            let Some(category) = self.find(current_id).await? else {
                break;
            };
            current = category.parent_id;
            path.push(category);
        }

        path.reverse();
        Ok(path)
    }

    /// True if making `proposed_parent_id` the parent of `category_id` would
    /// put `category_id` into its own ancestor chain. An ancestor chain that
    /// already loops is also reported as a cycle.
    async fn would_create_cycle(&self, category_id: Uuid, proposed_parent_id: Uuid) -> Result<bool> {
        let mut seen = HashSet::new();
        let mut current = Some(proposed_parent_id);

        while let Some(current_id) = current {
            if current_id == category_id || !seen.insert(current_id) {
                return Ok(true);
            }
            current = self.find(current_id).await?.and_then(|c| c.parent_id);
        }

        Ok(false)
    }

    async fn build_tree(&self, only_active: bool) -> Result<Vec<CategoryTreeNode>> {
        Ok(build_forest(self.list_all(only_active).await?))
    }

    /// Ids of all live descendants of `id`, breadth-first
    async fn get_descendant_ids(&self, id: Uuid) -> Result<Vec<Uuid>> {
        let mut descendants = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut queue = VecDeque::from([id]);

        while let Some(parent_id) = queue.pop_front() {
            for child in self.get_children(parent_id, false).await? {
                if seen.insert(child.id) {
                    descendants.push(child.id);
                    queue.push_back(child.id);
                }
            }
        }

        Ok(descendants)
    }
}
