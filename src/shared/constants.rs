/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// CATEGORY CONSTANTS
// =============================================================================

/// Maximum length of a category name
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;

/// Maximum length of any slug (categories, posts, tags)
pub const MAX_SLUG_LENGTH: usize = 100;

/// Number of categories reported in the "most posts" statistics list
pub const TOP_CATEGORIES_BY_POSTS: usize = 5;

/// Separator used when rendering a category path as a single string
pub const CATEGORY_PATH_SEPARATOR: &str = " > ";
