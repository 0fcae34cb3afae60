use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::cmp::Ordering;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::shared::constants::{MAX_CATEGORY_NAME_LENGTH, MAX_SLUG_LENGTH};

/// Database model for a blog category.
///
/// Categories form a forest through `parent_id`. Rows are never physically
/// removed; `deleted_at` marks a soft-deleted category and every query filters
/// on it.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub meta_keywords: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

fn checked_text(value: &str, field: &str, max_len: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    if trimmed.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(trimmed.to_string())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

impl Category {
    /// New active root or child category with empty display fields
    pub fn new(id: Uuid, name: &str, slug: &str, parent_id: Option<Uuid>) -> Result<Self> {
        let now = Utc::now();
        let mut category = Self {
            id,
            parent_id: None,
            name: checked_text(name, "name", MAX_CATEGORY_NAME_LENGTH)?,
            slug: checked_text(slug, "slug", MAX_SLUG_LENGTH)?,
            description: None,
            icon: None,
            color: None,
            sort_order: 0,
            is_active: true,
            meta_keywords: None,
            meta_description: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        category.set_parent(parent_id)?;
        Ok(category)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn update_basic_info(
        &mut self,
        name: &str,
        slug: &str,
        description: Option<String>,
    ) -> Result<()> {
        let name = checked_text(name, "name", MAX_CATEGORY_NAME_LENGTH)?;
        let slug = checked_text(slug, "slug", MAX_SLUG_LENGTH)?;
        self.name = name;
        self.slug = slug;
        self.description = trimmed(description);
        Ok(())
    }

    /// Reassign the parent. Only self-parenting is caught here; deeper cycles
    /// need the whole tree and are checked by the repository.
    pub fn set_parent(&mut self, parent_id: Option<Uuid>) -> Result<()> {
        if parent_id == Some(self.id) {
            return Err(AppError::Conflict(format!(
                "Category {} cannot be its own parent",
                self.id
            )));
        }
        self.parent_id = parent_id;
        Ok(())
    }

    pub fn set_display_style(&mut self, icon: Option<String>, color: Option<String>) {
        self.icon = trimmed(icon);
        self.color = trimmed(color);
    }

    pub fn update_seo_info(
        &mut self,
        meta_keywords: Option<String>,
        meta_description: Option<String>,
    ) {
        self.meta_keywords = trimmed(meta_keywords);
        self.meta_description = trimmed(meta_description);
    }

    pub fn enable(&mut self) {
        self.is_active = true;
    }

    pub fn disable(&mut self) {
        self.is_active = false;
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn mark_deleted(&mut self) {
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Sibling ordering: `sort_order` first, then `name`
    pub fn sibling_order(a: &Category, b: &Category) -> Ordering {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.cmp(&b.name))
    }
}
