use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;
use crate::features::categories::repositories::{CategoryFilter, CategoryRepository};

const CATEGORY_COLUMNS: &str = "id, parent_id, name, slug, description, icon, color, sort_order, \
     is_active, meta_keywords, meta_description, created_at, updated_at, deleted_at";

/// Advisory lock key serializing writes to the category tree across processes
const CATEGORY_TREE_LOCK_KEY: i64 = 0x0b10_9ca7;

/// Convert database error to more specific AppError with user-friendly messages
fn handle_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.code().as_deref() {
            // unique_violation
            Some("23505") => {
                return AppError::Conflict(
                    "A category with this slug already exists.".to_string(),
                );
            }
            // foreign_key_violation
            Some("23503") => {
                return AppError::NotFound("Parent category does not exist.".to_string());
            }
            // check_violation
            Some("23514") => {
                return AppError::Conflict("Category cannot be its own parent.".to_string());
            }
            _ => {}
        }
    }

    tracing::error!("Category query failed: {:?}", e);
    AppError::Database(e)
}

/// Substring pattern for `ILIKE ... ESCAPE '\'` matching `keyword` literally
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// PostgreSQL-backed category repository.
///
/// Every write runs in its own transaction holding a tree-wide advisory lock
/// and re-checks slug uniqueness, parent existence, acyclicity and deletion
/// preconditions before touching the row.
#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl std::fmt::Debug for PgCategoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgCategoryRepository")
            .field("pool", &"<PgPool>")
            .finish()
    }
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin_tree_write(&self) -> Result<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await.map_err(handle_db_error)?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(CATEGORY_TREE_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(handle_db_error)?;
        Ok(tx)
    }

    async fn slug_taken_in(
        tx: &mut Transaction<'static, Postgres>,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM categories
                WHERE slug = $1 AND deleted_at IS NULL AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(handle_db_error)
    }

    async fn ensure_parent_exists(
        tx: &mut Transaction<'static, Postgres>,
        parent_id: Option<Uuid>,
    ) -> Result<()> {
        let Some(parent_id) = parent_id else {
            return Ok(());
        };

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(parent_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(handle_db_error)?;

        if exists {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Parent category with id {} not found",
                parent_id
            )))
        }
    }

    /// Walks the ancestors of `parent_id` in SQL; UNION stops on loops
    async fn closes_cycle_in(
        tx: &mut Transaction<'static, Postgres>,
        category_id: Uuid,
        parent_id: Uuid,
    ) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            WITH RECURSIVE ancestors AS (
                SELECT id, parent_id FROM categories
                WHERE id = $1 AND deleted_at IS NULL
                UNION
                SELECT c.id, c.parent_id FROM categories c
                JOIN ancestors a ON c.id = a.parent_id
                WHERE c.deleted_at IS NULL
            )
            SELECT EXISTS (SELECT 1 FROM ancestors WHERE id = $2)
            "#,
        )
        .bind(parent_id)
        .bind(category_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(handle_db_error)
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn find(&self, id: Uuid) -> Result<Option<Category>> {
        let query = format!(
            "SELECT {} FROM categories WHERE id = $1 AND deleted_at IS NULL",
            CATEGORY_COLUMNS
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let query = format!(
            "SELECT {} FROM categories WHERE slug = $1 AND deleted_at IS NULL",
            CATEGORY_COLUMNS
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<Uuid>) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM categories
                WHERE slug = $1 AND deleted_at IS NULL AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(slug)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(handle_db_error)
    }

    async fn insert(&self, category: Category) -> Result<Category> {
        let mut tx = self.begin_tree_write().await?;

        if Self::slug_taken_in(&mut tx, &category.slug, None).await? {
            return Err(AppError::Conflict(format!(
                "Slug '{}' already exists",
                category.slug
            )));
        }
        Self::ensure_parent_exists(&mut tx, category.parent_id).await?;

        let query = format!(
            r#"
            INSERT INTO categories (
                id, parent_id, name, slug, description, icon, color, sort_order,
                is_active, meta_keywords, meta_description, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );
        let inserted = sqlx::query_as::<_, Category>(&query)
            .bind(category.id)
            .bind(category.parent_id)
            .bind(&category.name)
            .bind(&category.slug)
            .bind(&category.description)
            .bind(&category.icon)
            .bind(&category.color)
            .bind(category.sort_order)
            .bind(category.is_active)
            .bind(&category.meta_keywords)
            .bind(&category.meta_description)
            .bind(category.created_at)
            .bind(category.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(handle_db_error)?;

        tx.commit().await.map_err(handle_db_error)?;
        Ok(inserted)
    }

    async fn update(&self, category: Category) -> Result<Category> {
        let mut tx = self.begin_tree_write().await?;

        if Self::slug_taken_in(&mut tx, &category.slug, Some(category.id)).await? {
            return Err(AppError::Conflict(format!(
                "Slug '{}' already exists",
                category.slug
            )));
        }
        Self::ensure_parent_exists(&mut tx, category.parent_id).await?;
        if let Some(parent_id) = category.parent_id {
            if Self::closes_cycle_in(&mut tx, category.id, parent_id).await? {
                return Err(AppError::Conflict(format!(
                    "Setting parent {} on category {} would create a circular reference",
                    parent_id, category.id
                )));
            }
        }

        let query = format!(
            r#"
            UPDATE categories
            SET parent_id = $2,
                name = $3,
                slug = $4,
                description = $5,
                icon = $6,
                color = $7,
                sort_order = $8,
                is_active = $9,
                meta_keywords = $10,
                meta_description = $11,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );
        let updated = sqlx::query_as::<_, Category>(&query)
            .bind(category.id)
            .bind(category.parent_id)
            .bind(&category.name)
            .bind(&category.slug)
            .bind(&category.description)
            .bind(&category.icon)
            .bind(&category.color)
            .bind(category.sort_order)
            .bind(category.is_active)
            .bind(&category.meta_keywords)
            .bind(&category.meta_description)
            .fetch_optional(&mut *tx)
            .await
            .map_err(handle_db_error)?
            .ok_or_else(|| {
                AppError::NotFound(format!("Category with id {} not found", category.id))
            })?;

        tx.commit().await.map_err(handle_db_error)?;
        Ok(updated)
    }

    async fn delete(&self, category: &Category) -> Result<()> {
        let mut tx = self.begin_tree_write().await?;

        let (children, posts) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM categories WHERE parent_id = $1 AND deleted_at IS NULL),
                (SELECT COUNT(*) FROM posts WHERE category_id = $1 AND deleted_at IS NULL)
            "#,
        )
        .bind(category.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(handle_db_error)?;

        if children > 0 {
            return Err(AppError::Conflict(format!(
                "Category {} still has {} child categories",
                category.id, children
            )));
        }
        if posts > 0 {
            return Err(AppError::Conflict(format!(
                "Category {} still has {} associated posts",
                category.id, posts
            )));
        }

        let result = sqlx::query(
            r#"
            UPDATE categories
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(category.id)
        .execute(&mut *tx)
        .await
        .map_err(handle_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Category with id {} not found",
                category.id
            )));
        }

        tx.commit().await.map_err(handle_db_error)?;
        Ok(())
    }

    async fn list_all(&self, only_active: bool) -> Result<Vec<Category>> {
        let query = format!(
            r#"
            SELECT {} FROM categories
            WHERE deleted_at IS NULL AND ($1 = FALSE OR is_active = TRUE)
            ORDER BY sort_order, name COLLATE "C"
            "#,
            CATEGORY_COLUMNS
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(only_active)
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn list_paged(&self, filter: &CategoryFilter) -> Result<(Vec<Category>, i64)> {
        let pattern = filter
            .keyword
            .as_ref()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(like_pattern);

        let where_clause = r#"
            WHERE deleted_at IS NULL
              AND ($1::text IS NULL OR name ILIKE $1 ESCAPE '\' OR slug ILIKE $1 ESCAPE '\'
                   OR description ILIKE $1 ESCAPE '\')
              AND ($2::uuid[] IS NULL OR parent_id = ANY($2))
              AND ($3::bool IS NULL OR is_active = $3)
        "#;

        let count_query = format!("SELECT COUNT(*) FROM categories {}", where_clause);
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(&pattern)
            .bind(&filter.parent_ids)
            .bind(filter.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(handle_db_error)?;

        let query = format!(
            r#"
            SELECT {} FROM categories
            {}
            ORDER BY sort_order, name COLLATE "C"
            LIMIT $4 OFFSET $5
            "#,
            CATEGORY_COLUMNS, where_clause
        );
        let categories = sqlx::query_as::<_, Category>(&query)
            .bind(&pattern)
            .bind(&filter.parent_ids)
            .bind(filter.is_active)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)?;

        Ok((categories, total))
    }

    async fn get_children(&self, parent_id: Uuid, only_active: bool) -> Result<Vec<Category>> {
        let query = format!(
            r#"
            SELECT {} FROM categories
            WHERE parent_id = $1 AND deleted_at IS NULL AND ($2 = FALSE OR is_active = TRUE)
            ORDER BY sort_order, name COLLATE "C"
            "#,
            CATEGORY_COLUMNS
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(parent_id)
            .bind(only_active)
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn get_roots(&self, only_active: bool) -> Result<Vec<Category>> {
        let query = format!(
            r#"
            SELECT {} FROM categories
            WHERE parent_id IS NULL AND deleted_at IS NULL AND ($1 = FALSE OR is_active = TRUE)
            ORDER BY sort_order, name COLLATE "C"
            "#,
            CATEGORY_COLUMNS
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(only_active)
            .fetch_all(&self.pool)
            .await
            .map_err(handle_db_error)
    }

    async fn has_children(&self, id: Uuid) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM categories WHERE parent_id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(handle_db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn insert_category(
        repo: &PgCategoryRepository,
        name: &str,
        slug: &str,
        parent_id: Option<Uuid>,
    ) -> Category {
        let category = Category::new(Uuid::now_v7(), name, slug, parent_id).unwrap();
        repo.insert(category).await.unwrap()
    }

    fn filter_with_keyword(keyword: &str) -> CategoryFilter {
        CategoryFilter {
            keyword: Some(keyword.to_string()),
            limit: 50,
            ..Default::default()
        }
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("snake_case"), "%snake\\_case%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_rejects_cycle(pool: PgPool) {
        let repo = PgCategoryRepository::new(pool);
        let a = insert_category(&repo, "A", "a", None).await;
        let b = insert_category(&repo, "B", "b", Some(a.id)).await;
        let c = insert_category(&repo, "C", "c", Some(b.id)).await;

        let mut looped = a.clone();
        looped.parent_id = Some(c.id);
        let result = repo.update(looped).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let a_after = repo.get(a.id).await.unwrap();
        assert_eq!(a_after.parent_id, None);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_rejects_missing_parent(pool: PgPool) {
        let repo = PgCategoryRepository::new(pool);
        let mut category = insert_category(&repo, "Orphan", "orphan", None).await;

        category.parent_id = Some(Uuid::now_v7());
        let result = repo.update(category).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_rejects_live_children(pool: PgPool) {
        let repo = PgCategoryRepository::new(pool);
        let parent = insert_category(&repo, "News", "news", None).await;
        let child = insert_category(&repo, "Local", "local", Some(parent.id)).await;

        let result = repo.delete(&parent).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        repo.delete(&child).await.unwrap();
        repo.delete(&parent).await.unwrap();
        assert!(repo.find(parent.id).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_delete_rejects_live_posts(pool: PgPool) {
        let repo = PgCategoryRepository::new(pool.clone());
        let category = insert_category(&repo, "Reviews", "reviews", None).await;

        sqlx::query("INSERT INTO posts (id, category_id, title, slug) VALUES ($1, $2, $3, $4)")
            .bind(Uuid::now_v7())
            .bind(category.id)
            .bind("First review")
            .bind("first-review")
            .execute(&pool)
            .await
            .unwrap();

        let result = repo.delete(&category).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        sqlx::query("UPDATE posts SET deleted_at = NOW() WHERE category_id = $1")
            .bind(category.id)
            .execute(&pool)
            .await
            .unwrap();
        repo.delete(&category).await.unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_live_slug_is_conflict(pool: PgPool) {
        let repo = PgCategoryRepository::new(pool);
        insert_category(&repo, "Rust", "rust", None).await;

        let duplicate = Category::new(Uuid::now_v7(), "Rust again", "rust", None).unwrap();
        let result = repo.insert(duplicate).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let mut other = insert_category(&repo, "Go", "go", None).await;
        other.slug = "rust".to_string();
        let result = repo.update(other).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_soft_deleted_slug_can_be_reused(pool: PgPool) {
        let repo = PgCategoryRepository::new(pool);
        let old = insert_category(&repo, "Events", "events", None).await;
        repo.delete(&old).await.unwrap();

        assert!(!repo.slug_exists("events", None).await.unwrap());
        let new = insert_category(&repo, "Events", "events", None).await;

        let found = repo.find_by_slug("events").await.unwrap().unwrap();
        assert_eq!(found.id, new.id);
        assert!(repo.find(old.id).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_keyword_wildcards_match_literally(pool: PgPool) {
        let repo = PgCategoryRepository::new(pool);
        insert_category(&repo, "100% Rust", "full-rust", None).await;
        insert_category(&repo, "100 Rust", "hundred-rust", None).await;
        insert_category(&repo, "snake_case", "snake-case", None).await;
        insert_category(&repo, "snakecase", "snakecase", None).await;

        let (items, total) = repo.list_paged(&filter_with_keyword("%")).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].name, "100% Rust");

        let (items, total) = repo.list_paged(&filter_with_keyword("_")).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].name, "snake_case");

        let (_, total) = repo.list_paged(&filter_with_keyword("RUST")).await.unwrap();
        assert_eq!(total, 2);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_listing_order_matches_sibling_order(pool: PgPool) {
        let repo = PgCategoryRepository::new(pool);
        let parent = insert_category(&repo, "Fruit", "fruit", None).await;
        for (name, slug) in [("apple", "apple"), ("Banana", "banana"), ("Zucchini", "zucchini")] {
            insert_category(&repo, name, slug, Some(parent.id)).await;
        }

        let children = repo.get_children(parent.id, false).await.unwrap();
        let mut expected = children.clone();
        expected.sort_by(Category::sibling_order);
        let names: Vec<&str> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Banana", "Zucchini", "apple"]);
        assert_eq!(children, expected);

        let paged = CategoryFilter {
            parent_ids: Some(vec![parent.id]),
            limit: 50,
            ..Default::default()
        };
        let (items, _) = repo.list_paged(&paged).await.unwrap();
        assert_eq!(items, children);
    }
}
