use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Counts live (not soft-deleted) posts per category
#[async_trait]
pub trait PostCounter: Send + Sync {
    async fn count_posts_by_category(&self, category_id: Uuid) -> Result<i64>;

    /// Counts for several categories at once. Categories without posts map to 0.
    async fn count_posts_by_categories(&self, category_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>> {
        let mut counts = HashMap::with_capacity(category_ids.len());
        for &id in category_ids {
            counts.insert(id, self.count_posts_by_category(id).await?);
        }
        Ok(counts)
    }
}

#[derive(Clone)]
pub struct PgPostCounter {
    pool: PgPool,
}

impl PgPostCounter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostCounter for PgPostCounter {
    async fn count_posts_by_category(&self, category_id: Uuid) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM posts WHERE category_id = $1 AND deleted_at IS NULL",
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count posts for category {}: {:?}", category_id, e);
            AppError::Database(e)
        })
    }

    async fn count_posts_by_categories(&self, category_ids: &[Uuid]) -> Result<HashMap<Uuid, i64>> {
        if category_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT category_id, COUNT(*)
            FROM posts
            WHERE category_id = ANY($1) AND deleted_at IS NULL
            GROUP BY category_id
            "#,
        )
        .bind(category_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count posts by category: {:?}", e);
            AppError::Database(e)
        })?;

        let mut counts: HashMap<Uuid, i64> = category_ids.iter().map(|&id| (id, 0)).collect();
        counts.extend(rows);
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn insert_category(pool: &PgPool, slug: &str) -> Uuid {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO categories (id, name, slug) VALUES ($1, $2, $2)")
            .bind(id)
            .bind(slug)
            .execute(pool)
            .await
            .unwrap();
        id
    }

    async fn insert_post(pool: &PgPool, category_id: Uuid, slug: &str, deleted: bool) {
        sqlx::query(
            r#"
            INSERT INTO posts (id, category_id, title, slug, deleted_at)
            VALUES ($1, $2, $3, $3, CASE WHEN $4 THEN NOW() END)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(category_id)
        .bind(slug)
        .bind(deleted)
        .execute(pool)
        .await
        .unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_counts_only_live_posts(pool: PgPool) {
        let busy = insert_category(&pool, "busy").await;
        let quiet = insert_category(&pool, "quiet").await;
        insert_post(&pool, busy, "one", false).await;
        insert_post(&pool, busy, "two", false).await;
        insert_post(&pool, busy, "gone", true).await;

        let counter = PgPostCounter::new(pool);
        assert_eq!(counter.count_posts_by_category(busy).await.unwrap(), 2);

        let counts = counter
            .count_posts_by_categories(&[busy, quiet])
            .await
            .unwrap();
        assert_eq!(counts.get(&busy), Some(&2));
        assert_eq!(counts.get(&quiet), Some(&0));
    }
}
