mod category;
mod category_tree;

pub use category::Category;
pub use category_tree::{build_forest, CategoryTreeNode};
