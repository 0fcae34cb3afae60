use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::slugs::repositories::SlugLookup;
use crate::shared::slug::SlugNamespace;

/// Live slugs per namespace, keyed by owning row id
#[derive(Debug, Default)]
pub struct InMemorySlugLookup {
    slugs: RwLock<HashMap<SlugNamespace, HashMap<Uuid, String>>>,
}

impl InMemorySlugLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, namespace: SlugNamespace, id: Uuid, slug: &str) {
        self.slugs
            .write()
            .await
            .entry(namespace)
            .or_default()
            .insert(id, slug.to_string());
    }
}

#[async_trait]
impl SlugLookup for InMemorySlugLookup {
    async fn slug_exists(
        &self,
        namespace: SlugNamespace,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<bool> {
        Ok(self.slugs.read().await.get(&namespace).is_some_and(|rows| {
            rows.iter()
                .any(|(id, taken)| taken == slug && Some(*id) != exclude_id)
        }))
    }
}
