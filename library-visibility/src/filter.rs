//! Scope filtering over loaded catalog rows.
//!
//! Categories are admitted by their subspecialty. Resources carry no
//! visibility of their own and are admitted through their category.

use std::collections::HashSet;

use library_catalog::{Category, Resource};

use crate::scope::Scope;

impl Scope {
    /// Check if content owned by a subspecialty is visible.
    pub fn admits_subspecialty(&self, subspecialty_id: &str) -> bool {
        self.load_all || self.effective_subspecialty_id.as_deref() == Some(subspecialty_id)
    }

    /// Check if a category is visible.
    pub fn admits_category(&self, category: &Category) -> bool {
        self.admits_subspecialty(&category.subspecialty_id)
    }

    /// Visible categories, in input order.
    pub fn visible_categories<'a>(&self, categories: &'a [Category]) -> Vec<&'a Category> {
        categories
            .iter()
            .filter(|c| self.admits_category(c))
            .collect()
    }

    /// Visible resources, in input order.
    ///
    /// A resource whose category is not in `categories` is hidden unless the
    /// scope loads everything.
    pub fn visible_resources<'a>(
        &self,
        resources: &'a [Resource],
        categories: &[Category],
    ) -> Vec<&'a Resource> {
        if self.load_all {
            return resources.iter().collect();
        }

        let visible: HashSet<&str> = categories
            .iter()
            .filter(|c| self.admits_category(c))
            .map(|c| c.id.as_str())
            .collect();

        resources
            .iter()
            .filter(|r| visible.contains(r.category_id.as_str()))
            .collect()
    }
}
