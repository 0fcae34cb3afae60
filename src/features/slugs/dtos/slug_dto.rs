use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::shared::slug::SlugNamespace;

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlugGenerateParams {
    /// `categories`, `posts` or `tags`
    pub namespace: SlugNamespace,
    /// Display name to derive the slug from
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlugAvailabilityParams {
    /// `categories`, `posts` or `tags`
    pub namespace: SlugNamespace,
    pub slug: String,
    /// Row allowed to already own the slug
    pub exclude_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NamespacedSlugDto {
    pub namespace: SlugNamespace,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NamespacedSlugAvailabilityDto {
    pub namespace: SlugNamespace,
    pub slug: String,
    pub available: bool,
}
