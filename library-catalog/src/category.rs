//! Category hierarchy
//!
//! Categories belong to a subspecialty and form a two-level tree: top-level
//! categories and their sub-categories. Resources hang off categories, and a
//! resource's visibility is derived from its category's subspecialty.

use serde::{Deserialize, Serialize};

use crate::reorder::Positioned;

/// A catalog category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Category ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Subspecialty that owns this category
    pub subspecialty_id: String,

    /// Parent category (None for top-level categories)
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Sort position among siblings
    #[serde(default)]
    pub position: i32,
}

impl Category {
    /// Creates a new top-level category.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        subspecialty_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            subspecialty_id: subspecialty_id.into(),
            parent_id: None,
            position: 0,
        }
    }

    /// Make this a sub-category of `parent_id`.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the sort position.
    pub fn with_position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }

    /// Check if this is a top-level category.
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl Positioned for Category {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn set_position(&mut self, position: i32) {
        self.position = position;
    }
}

/// A top-level category with its sub-categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryNode {
    /// The top-level category
    pub category: Category,

    /// Sub-categories, ordered by position
    pub children: Vec<Category>,
}

/// Two-level category tree.
///
/// # Examples
///
/// ```
/// use library_catalog::{Category, CategoryTree};
///
/// let tree = CategoryTree::build(vec![
///     Category::new("knee", "Knee", "sports").with_position(1),
///     Category::new("acl", "ACL", "sports").with_parent("knee"),
///     Category::new("shoulder", "Shoulder", "sports").with_position(0),
/// ]);
///
/// assert_eq!(tree.roots().len(), 2);
/// assert_eq!(tree.roots()[0].category.id, "shoulder");
/// assert_eq!(tree.roots()[1].children[0].id, "acl");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryTree {
    roots: Vec<CategoryNode>,
}

impl CategoryTree {
    /// Build a tree from a flat category list.
    ///
    /// Categories whose parent is missing, or whose parent is itself a
    /// sub-category, are promoted to top level. Siblings are ordered by
    /// position, then name.
    pub fn build(categories: Vec<Category>) -> Self {
        let top_level_ids: std::collections::HashSet<String> = categories
            .iter()
            .filter(|c| c.is_top_level())
            .map(|c| c.id.clone())
            .collect();

        let (mut roots, mut nested): (Vec<Category>, Vec<Category>) =
            categories.into_iter().partition(|c| match &c.parent_id {
                None => true,
                Some(parent) => !top_level_ids.contains(parent),
            });

        sort_siblings(&mut roots);
        sort_siblings(&mut nested);

        let roots = roots
            .into_iter()
            .map(|category| {
                let (children, rest): (Vec<Category>, Vec<Category>) = nested
                    .drain(..)
                    .partition(|c| c.parent_id.as_deref() == Some(category.id.as_str()));
                nested = rest;
                CategoryNode { category, children }
            })
            .collect();

        Self { roots }
    }

    /// Get the top-level nodes.
    pub fn roots(&self) -> &[CategoryNode] {
        &self.roots
    }

    /// Find a category anywhere in the tree.
    pub fn find(&self, id: &str) -> Option<&Category> {
        self.roots.iter().find_map(|node| {
            if node.category.id == id {
                Some(&node.category)
            } else {
                node.children.iter().find(|c| c.id == id)
            }
        })
    }

    /// Flatten in display order: each parent followed by its children.
    pub fn flatten(&self) -> Vec<&Category> {
        self.roots
            .iter()
            .flat_map(|node| std::iter::once(&node.category).chain(node.children.iter()))
            .collect()
    }

    /// Total number of categories in the tree.
    pub fn len(&self) -> usize {
        self.roots.iter().map(|node| 1 + node.children.len()).sum()
    }

    /// Check if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

fn sort_siblings(categories: &mut [Category]) {
    categories.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Category> {
        vec![
            Category::new("knee", "Knee", "sports").with_position(2),
            Category::new("shoulder", "Shoulder", "sports").with_position(1),
            Category::new("acl", "ACL", "sports").with_parent("knee").with_position(1),
            Category::new("meniscus", "Meniscus", "sports").with_parent("knee").with_position(0),
            Category::new("rotator", "Rotator Cuff", "sports").with_parent("shoulder"),
        ]
    }

    #[test]
    fn test_tree_groups_children() {
        let tree = CategoryTree::build(sample());

        assert_eq!(tree.roots().len(), 2);
        assert_eq!(tree.roots()[0].category.id, "shoulder");
        assert_eq!(tree.roots()[1].category.id, "knee");

        let knee_children: Vec<&str> =
            tree.roots()[1].children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(knee_children, vec!["meniscus", "acl"]);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_orphans_are_promoted() {
        let tree = CategoryTree::build(vec![
            Category::new("a", "Alpha", "s"),
            Category::new("orphan", "Orphan", "s").with_parent("deleted"),
        ]);

        assert_eq!(tree.roots().len(), 2);
        assert!(tree.roots().iter().all(|n| n.children.is_empty()));
    }

    #[test]
    fn test_over_nested_categories_are_promoted() {
        let tree = CategoryTree::build(vec![
            Category::new("a", "A", "s"),
            Category::new("b", "B", "s").with_parent("a"),
            Category::new("c", "C", "s").with_parent("b"),
        ]);

        assert_eq!(tree.roots().len(), 2);
        assert_eq!(tree.len(), 3);
        assert!(tree.find("c").is_some());
    }

    #[test]
    fn test_ties_sort_by_name() {
        let tree = CategoryTree::build(vec![
            Category::new("z", "zeta", "s"),
            Category::new("a", "Alpha", "s"),
        ]);
        assert_eq!(tree.roots()[0].category.id, "a");
    }

    #[test]
    fn test_flatten_order() {
        let tree = CategoryTree::build(sample());
        let ids: Vec<&str> = tree.flatten().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["shoulder", "rotator", "knee", "meniscus", "acl"]);
    }

    #[test]
    fn test_empty_tree() {
        let tree = CategoryTree::build(Vec::new());
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert!(tree.find("x").is_none());
    }
}
