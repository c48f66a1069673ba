//! # Catalog Administration
//!
//! Catalog-management actions and the reach of an administrative grant.
//! A grant combines a [`Role`] with the specialty or subspecialty it is
//! anchored to.

use serde::{Deserialize, Serialize};

use crate::roles::Role;

/// Actions available on the admin dashboards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CatalogAction {
    /// Add a resource to a category.
    CreateResource,
    /// Edit resource details.
    UpdateResource,
    /// Remove a resource.
    DeleteResource,
    /// Create, rename and nest categories.
    ManageCategories,
    /// Reorder categories and resources.
    Reorder,
    /// Accept or reject user suggestions.
    ReviewSuggestions,
    /// Manage companies and their rep contacts.
    ManageCompanies,
    /// View the analytics dashboard.
    ViewAnalytics,
    /// Manage users and assign roles.
    ManageUsers,
}

impl CatalogAction {
    /// Get the string representation of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogAction::CreateResource => "create_resource",
            CatalogAction::UpdateResource => "update_resource",
            CatalogAction::DeleteResource => "delete_resource",
            CatalogAction::ManageCategories => "manage_categories",
            CatalogAction::Reorder => "reorder",
            CatalogAction::ReviewSuggestions => "review_suggestions",
            CatalogAction::ManageCompanies => "manage_companies",
            CatalogAction::ViewAnalytics => "view_analytics",
            CatalogAction::ManageUsers => "manage_users",
        }
    }

    /// Parse action from string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "create_resource" => Some(CatalogAction::CreateResource),
            "update_resource" | "edit_resource" => Some(CatalogAction::UpdateResource),
            "delete_resource" | "remove_resource" => Some(CatalogAction::DeleteResource),
            "manage_categories" => Some(CatalogAction::ManageCategories),
            "reorder" => Some(CatalogAction::Reorder),
            "review_suggestions" => Some(CatalogAction::ReviewSuggestions),
            "manage_companies" => Some(CatalogAction::ManageCompanies),
            "view_analytics" | "analytics" => Some(CatalogAction::ViewAnalytics),
            "manage_users" => Some(CatalogAction::ManageUsers),
            _ => None,
        }
    }

    /// Get all actions.
    pub fn all() -> Vec<Self> {
        vec![
            CatalogAction::CreateResource,
            CatalogAction::UpdateResource,
            CatalogAction::DeleteResource,
            CatalogAction::ManageCategories,
            CatalogAction::Reorder,
            CatalogAction::ReviewSuggestions,
            CatalogAction::ManageCompanies,
            CatalogAction::ViewAnalytics,
            CatalogAction::ManageUsers,
        ]
    }

    /// Check if this action permanently removes catalog data.
    pub fn is_destructive(&self) -> bool {
        matches!(self, CatalogAction::DeleteResource)
    }

    /// Check if this action is scoped to a specialty or subspecialty.
    ///
    /// Unscoped actions (companies, users, analytics) are decided by role alone.
    pub fn is_scoped(&self) -> bool {
        matches!(
            self,
            CatalogAction::CreateResource
                | CatalogAction::UpdateResource
                | CatalogAction::DeleteResource
                | CatalogAction::ManageCategories
                | CatalogAction::Reorder
                | CatalogAction::ReviewSuggestions
        )
    }
}

/// Part of the catalog an administrator may curate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AdminScope {
    /// No administrative reach.
    None,
    /// A single subspecialty.
    Subspecialty(String),
    /// A specialty and all of its subspecialties.
    Specialty(String),
    /// The whole catalog.
    All,
}

impl AdminScope {
    /// Derive the scope of a role anchored at the given specialty/subspecialty.
    ///
    /// A tiered admin whose anchor id is missing gets no reach rather than
    /// a wider one.
    ///
    /// # Example
    ///
    /// ```
    /// use library_rbac::{AdminScope, Role};
    ///
    /// let scope = AdminScope::for_role(Role::SpecialtyAdmin, Some("ortho"), None);
    /// assert_eq!(scope, AdminScope::Specialty("ortho".to_string()));
    ///
    /// let scope = AdminScope::for_role(Role::SubspecialtyAdmin, Some("ortho"), None);
    /// assert_eq!(scope, AdminScope::None);
    /// ```
    pub fn for_role(role: Role, specialty_id: Option<&str>, subspecialty_id: Option<&str>) -> Self {
        match role {
            Role::User => AdminScope::None,
            Role::SubspecialtyAdmin => subspecialty_id
                .map(|id| AdminScope::Subspecialty(id.to_string()))
                .unwrap_or(AdminScope::None),
            Role::SpecialtyAdmin => specialty_id
                .map(|id| AdminScope::Specialty(id.to_string()))
                .unwrap_or(AdminScope::None),
            Role::Admin | Role::SuperAdmin => AdminScope::All,
        }
    }

    /// Check if this scope covers catalog content at the given location.
    ///
    /// # Arguments
    ///
    /// * `specialty_id` - Specialty owning the content
    /// * `subspecialty_id` - Subspecialty owning the content
    pub fn covers(&self, specialty_id: Option<&str>, subspecialty_id: Option<&str>) -> bool {
        match self {
            AdminScope::None => false,
            AdminScope::All => true,
            AdminScope::Specialty(id) => specialty_id == Some(id.as_str()),
            AdminScope::Subspecialty(id) => subspecialty_id == Some(id.as_str()),
        }
    }

    /// Check if this scope grants anything.
    pub fn is_none(&self) -> bool {
        matches!(self, AdminScope::None)
    }
}

impl Default for AdminScope {
    fn default() -> Self {
        AdminScope::None
    }
}

/// An administrative grant: a role together with its scope.
///
/// # Example
///
/// ```
/// use library_rbac::{AdminGrant, CatalogAction, Role};
///
/// let grant = AdminGrant::new(Role::SubspecialtyAdmin, Some("ortho"), Some("hand"));
/// assert!(grant.permits_in(CatalogAction::CreateResource, Some("ortho"), Some("hand")));
/// assert!(!grant.permits_in(CatalogAction::CreateResource, Some("ortho"), Some("spine")));
/// assert!(!grant.permits(CatalogAction::ManageUsers));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminGrant {
    /// The role granting the capability.
    pub role: Role,
    /// Where the role applies.
    pub scope: AdminScope,
}

impl AdminGrant {
    /// Build a grant for a role anchored at the given specialty/subspecialty.
    pub fn new(role: Role, specialty_id: Option<&str>, subspecialty_id: Option<&str>) -> Self {
        Self {
            role,
            scope: AdminScope::for_role(role, specialty_id, subspecialty_id),
        }
    }

    /// Check if the grant permits an action anywhere in its scope.
    pub fn permits(&self, action: CatalogAction) -> bool {
        if self.scope.is_none() {
            return false;
        }

        match action {
            CatalogAction::ManageUsers => self.role.can_manage_users(),
            CatalogAction::ManageCompanies => self.role.can_manage_companies(),
            CatalogAction::ViewAnalytics => self.role.can_view_analytics(),
            _ => self.role.is_admin(),
        }
    }

    /// Check if the grant permits an action on content at a specific location.
    ///
    /// Unscoped actions ignore the location.
    pub fn permits_in(
        &self,
        action: CatalogAction,
        specialty_id: Option<&str>,
        subspecialty_id: Option<&str>,
    ) -> bool {
        if !self.permits(action) {
            return false;
        }

        if action.is_scoped() {
            self.scope.covers(specialty_id, subspecialty_id)
        } else {
            true
        }
    }
}
