use std::sync::Arc;
use uuid::Uuid;

use crate::core::config::CategoryConfig;
use crate::core::error::Result;
use crate::features::slugs::dtos::{NamespacedSlugAvailabilityDto, NamespacedSlugDto};
use crate::features::slugs::repositories::SlugLookup;
use crate::shared::slug::{SlugGenerator, SlugNamespace};

/// Slug generation and availability for every namespace
pub struct SlugService {
    lookup: Arc<dyn SlugLookup>,
    category_generator: SlugGenerator,
}

impl SlugService {
    pub fn new(lookup: Arc<dyn SlugLookup>, config: &CategoryConfig) -> Self {
        Self {
            lookup,
            category_generator: SlugGenerator::new(config.empty_slug_fallback.clone()),
        }
    }

    fn generator(&self, namespace: SlugNamespace) -> SlugGenerator {
        match namespace {
            SlugNamespace::Categories => self.category_generator.clone(),
            other => SlugGenerator::for_namespace(other),
        }
    }

    /// Unused slug for `name` within `namespace`
    pub async fn generate(&self, namespace: SlugNamespace, name: &str) -> Result<NamespacedSlugDto> {
        let lookup = Arc::clone(&self.lookup);
        let slug = self
            .generator(namespace)
            .generate_async(name, move |candidate| {
                let lookup = Arc::clone(&lookup);
                async move { lookup.slug_exists(namespace, &candidate, None).await }
            })
            .await?;

        tracing::debug!("Generated slug '{}' in {}", slug, namespace);
        Ok(NamespacedSlugDto { namespace, slug })
    }

    pub async fn check_available(
        &self,
        namespace: SlugNamespace,
        slug: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<NamespacedSlugAvailabilityDto> {
        let taken = self.lookup.slug_exists(namespace, slug, exclude_id).await?;
        Ok(NamespacedSlugAvailabilityDto {
            namespace,
            slug: slug.to_string(),
            available: !taken,
        })
    }
}
