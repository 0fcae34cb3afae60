use std::sync::Arc;
use uuid::Uuid;

use crate::core::config::CategoryConfig;
use crate::features::categories::dtos::{CategoryResponseDto, CreateCategoryDto};
use crate::features::categories::repositories::InMemoryCategoryRepository;
use crate::features::categories::CategoryService;

/// Category service over a fresh in-memory store. The store doubles as the
/// post counter, so tests can seed post counts through it.
pub fn category_service_with_memory() -> (CategoryService, Arc<InMemoryCategoryRepository>) {
    let repository = Arc::new(InMemoryCategoryRepository::new());
    let service = CategoryService::new(
        repository.clone(),
        repository.clone(),
        &CategoryConfig::default(),
    );
    (service, repository)
}

pub async fn create_category(
    service: &CategoryService,
    name: &str,
    slug: Option<&str>,
    parent_id: Option<Uuid>,
) -> CategoryResponseDto {
    service
        .create(CreateCategoryDto::new(
            name,
            slug.map(str::to_string),
            parent_id,
        ))
        .await
        .unwrap()
}
