use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::Result;
use crate::shared::slug::SlugNamespace;

/// Existence check for slugs across namespaces. Soft-deleted rows never
/// count as taken.
#[async_trait]
pub trait SlugLookup: Send + Sync {
    async fn slug_exists(
        &self,
        namespace: SlugNamespace,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool>;
}

/// Slug lookup against the `categories`, `posts` and `tags` tables
#[derive(Clone)]
pub struct PgSlugLookup {
    pool: PgPool,
}

impl std::fmt::Debug for PgSlugLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgSlugLookup")
            .field("pool", &"<PgPool>")
            .finish()
    }
}

impl PgSlugLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn table(namespace: SlugNamespace) -> &'static str {
        match namespace {
            SlugNamespace::Categories => "categories",
            SlugNamespace::Posts => "posts",
            SlugNamespace::Tags => "tags",
        }
    }
}

#[async_trait]
impl SlugLookup for PgSlugLookup {
    async fn slug_exists(
        &self,
        namespace: SlugNamespace,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool> {
        // Table names come from a closed set, never from input
        let sql = format!(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM {}
                WHERE slug = $1
                  AND deleted_at IS NULL
                  AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
            Self::table(namespace)
        );

        let exists = sqlx::query_scalar::<_, bool>(&sql)
            .bind(slug)
            .bind(exclude_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Slug lookup in {} failed: {:?}", namespace, e);
                e
            })?;

        Ok(exists)
    }
}
