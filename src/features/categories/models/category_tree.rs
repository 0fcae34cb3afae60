use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::Category;

/// A category with its loaded descendants
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTreeNode {
    pub category: Category,
    pub children: Vec<CategoryTreeNode>,
}

impl CategoryTreeNode {
    /// Depth-first iterator over this node and all its descendants
    pub fn iter(&self) -> impl Iterator<Item = &CategoryTreeNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// Assemble a forest from a flat list of categories.
///
/// A category whose parent is not in `categories` (filtered out, deleted or
/// dangling) becomes a root. Every level is ordered by `(sort_order, name)`.
/// Categories caught in a parent loop never reach a root and are dropped.
pub fn build_forest(categories: Vec<Category>) -> Vec<CategoryTreeNode> {
    let ids: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();
    let total = categories.len();

    let mut roots = Vec::new();
    let mut children_of: HashMap<Uuid, Vec<Category>> = HashMap::new();
    for category in categories {
        match category.parent_id {
            Some(parent_id) if ids.contains(&parent_id) => {
                children_of.entry(parent_id).or_default().push(category)
            }
            _ => roots.push(category),
        }
    }

    roots.sort_by(Category::sibling_order);
    let forest: Vec<CategoryTreeNode> = roots
        .into_iter()
        .map(|root| attach_children(root, &mut children_of))
        .collect();

    if !children_of.is_empty() {
        let placed: usize = forest.iter().map(|root| root.iter().count()).sum();
        tracing::warn!(
            "Category tree has {} categories in a parent loop; they were left out",
            total - placed
        );
    }

    forest
}

fn attach_children(
    category: Category,
    children_of: &mut HashMap<Uuid, Vec<Category>>,
) -> CategoryTreeNode {
    let mut children = children_of.remove(&category.id).unwrap_or_default();
    children.sort_by(Category::sibling_order);

    let children = children
        .into_iter()
        .map(|child| attach_children(child, children_of))
        .collect();

    CategoryTreeNode { category, children }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, parent_id: Option<Uuid>) -> Category {
        Category::new(Uuid::new_v4(), name, &name.to_lowercase(), parent_id).unwrap()
    }

    #[test]
    fn test_three_levels_are_nested() {
        let root = category("R", None);
        let child = category("C1", Some(root.id));
        let grandchild = category("C2", Some(child.id));

        let forest = build_forest(vec![grandchild.clone(), root.clone(), child.clone()]);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].category.id, root.id);
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].category.id, child.id);
        assert_eq!(forest[0].children[0].children.len(), 1);
        assert_eq!(forest[0].children[0].children[0].category.id, grandchild.id);
    }

    #[test]
    fn test_unresolved_parent_becomes_root() {
        let orphan = category("Orphan", Some(Uuid::new_v4()));
        let forest = build_forest(vec![orphan.clone()]);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].category.id, orphan.id);
    }

    #[test]
    fn test_every_level_ordered_by_sort_order_then_name() {
        let mut zeta = category("Zeta", None);
        zeta.sort_order = -1;
        let alpha = category("Alpha", None);
        let beta = category("Beta", None);
        let mut second = category("B child", Some(alpha.id));
        second.sort_order = 2;
        let mut first = category("A child", Some(alpha.id));
        first.sort_order = 2;
        let mut early = category("Z child", Some(alpha.id));
        early.sort_order = 1;

        let forest = build_forest(vec![beta, alpha, zeta, second, first, early]);

        let roots: Vec<&str> = forest.iter().map(|n| n.category.name.as_str()).collect();
        assert_eq!(roots, vec!["Zeta", "Alpha", "Beta"]);

        let children: Vec<&str> = forest[1]
            .children
            .iter()
            .map(|n| n.category.name.as_str())
            .collect();
        assert_eq!(children, vec!["Z child", "A child", "B child"]);
    }

    #[test]
    fn test_parent_loop_is_dropped() {
        let mut a = category("A", None);
        let mut b = category("B", None);
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        let root = category("Root", None);

        let forest = build_forest(vec![a, b, root.clone()]);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].category.id, root.id);
    }

    #[test]
    fn test_iter_visits_all_descendants() {
        let root = category("R", None);
        let left = category("L", Some(root.id));
        let right = category("R2", Some(root.id));
        let leaf = category("Leaf", Some(left.id));

        let forest = build_forest(vec![root, left, right, leaf]);
        let names: Vec<&str> = forest[0]
            .iter()
            .map(|n| n.category.name.as_str())
            .collect();
        assert_eq!(names, vec!["R", "L", "Leaf", "R2"]);
    }
}
