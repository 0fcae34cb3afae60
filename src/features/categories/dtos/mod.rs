pub mod category_dto;

pub use category_dto::{
    CategoryBriefDto, CategoryPathDto, CategoryQueryParams, CategoryResponseDto,
    CategoryStatisticsDto, CategoryTreeDto, CreateCategoryDto, GenerateSlugQuery,
    GeneratedSlugDto, MoveCategoryDto, OnlyActiveQuery, SlugAvailabilityDto,
    SlugAvailabilityQuery, UpdateCategoryDto,
};
