pub mod slug_dto;

pub use slug_dto::{
    NamespacedSlugAvailabilityDto, NamespacedSlugDto, SlugAvailabilityParams, SlugGenerateParams,
};
