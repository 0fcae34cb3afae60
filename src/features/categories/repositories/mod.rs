mod category_repository;
#[cfg(test)]
mod memory;
mod pg_category_repository;

pub use category_repository::{CategoryFilter, CategoryRepository};
#[cfg(test)]
pub use memory::InMemoryCategoryRepository;
pub use pg_category_repository::PgCategoryRepository;
