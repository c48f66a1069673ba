//! # Capability Gates
//!
//! Boolean checks that decide which actions are offered to a profile.
//!
//! Interaction gating follows the user type, admin gating follows the role.
//! The two axes never influence each other.
//!
//! Every gate accepts an absent profile and answers `false`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use library_catalog::{ActiveCompanySet, Category, Profile, Resource};
use library_rbac::{AdminGrant, AdminScope, CatalogAction, Interaction, UserType};

/// Check if a profile may use interactive features (favorite, note,
/// upcoming case, rating).
///
/// True iff the profile carries an allow-listed user type.
///
/// ```
/// use library_catalog::Profile;
/// use library_visibility::can_interact;
/// use serde_json::json;
///
/// let surgeon = Profile::from_json(&json!({ "userType": "Surgeon " }));
/// assert!(can_interact(Some(&surgeon)));
///
/// let confused = Profile::from_json(&json!({ "userType": 42 }));
/// assert!(!can_interact(Some(&confused)));
/// assert!(!can_interact(None));
/// ```
pub fn can_interact(profile: Option<&Profile>) -> bool {
    profile.map_or(false, |p| p.user_type.is_some())
}

/// Check if a profile holds any administrative role.
///
/// ```
/// use library_catalog::Profile;
/// use library_visibility::is_admin;
/// use serde_json::json;
///
/// let admin = Profile::from_json(&json!({ "role": "subspecialty_admin" }));
/// assert!(is_admin(Some(&admin)));
/// assert!(!is_admin(None));
/// ```
pub fn is_admin(profile: Option<&Profile>) -> bool {
    profile.map_or(false, |p| p.role.is_admin())
}

/// Check if a company has at least one representative in the active set.
///
/// Absent or blank company names are never active.
pub fn is_company_active(company_name: Option<&str>, active: &ActiveCompanySet) -> bool {
    company_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or(false, |name| active.contains(name))
}

/// Check if the "Contact Rep" action is offered on a resource.
///
/// Requires both a company and a product name, and a representative of
/// that company for the resource's subspecialty. The subspecialty comes
/// from the resource's category; a resource whose category is not in
/// `categories` is never offered.
pub fn can_contact_rep(
    resource: &Resource,
    categories: &[Category],
    active: &ActiveCompanySet,
) -> bool {
    if !resource.has_company_and_product() {
        return false;
    }
    let Some(company) = resource.company() else {
        return false;
    };
    categories
        .iter()
        .find(|c| c.id == resource.category_id)
        .map_or(false, |category| active.contains_in(company, &category.subspecialty_id))
}

/// Read a profile from an untyped JSON value.
///
/// `null` and a missing value mean "no profile". Anything else goes through
/// the lenient profile deserializer.
pub fn profile_from_value(value: Option<&Value>) -> Option<Profile> {
    match value {
        None | Some(Value::Null) => None,
        Some(value) => Some(Profile::from_json(value)),
    }
}

/// All gating flags for a profile, computed once.
///
/// # Examples
///
/// ```
/// use library_catalog::Profile;
/// use library_rbac::{CatalogAction, Interaction, Role};
/// use library_visibility::Capabilities;
///
/// let profile = Profile::new("u1", "u1@example.com")
///     .with_role(Role::SpecialtyAdmin)
///     .with_specialty("ortho");
/// let caps = Capabilities::for_profile(Some(&profile));
///
/// assert!(caps.is_admin);
/// assert!(!caps.can_interact);
/// assert!(!caps.permits(Interaction::Favorite));
/// assert!(caps.permits_action(CatalogAction::Reorder));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// User type the interaction checks are made against
    pub user_type: Option<UserType>,

    /// Interactive features are available
    pub can_interact: bool,

    /// Some administrative role is held
    pub is_admin: bool,

    /// Administrative grant derived from role and placement
    pub admin: AdminGrant,
}

impl Capabilities {
    /// Compute capabilities for a profile.
    pub fn for_profile(profile: Option<&Profile>) -> Self {
        let admin = match profile {
            Some(p) => AdminGrant::new(
                p.role,
                p.specialty_id.as_deref(),
                p.subspecialty_id.as_deref(),
            ),
            None => AdminGrant::new(Default::default(), None, None),
        };

        Self {
            user_type: profile.and_then(|p| p.user_type),
            can_interact: can_interact(profile),
            is_admin: is_admin(profile),
            admin,
        }
    }

    /// Check if an interaction is offered.
    pub fn permits(&self, interaction: Interaction) -> bool {
        interaction.permitted_for(self.user_type)
    }

    /// Interactions offered, in display order.
    pub fn interactions(&self) -> Vec<Interaction> {
        Interaction::all()
            .into_iter()
            .filter(|i| self.permits(*i))
            .collect()
    }

    /// Check if a catalog action is permitted anywhere in the admin scope.
    pub fn permits_action(&self, action: CatalogAction) -> bool {
        self.admin.permits(action)
    }

    /// Check if a catalog action is permitted on content at a location.
    pub fn permits_action_in(
        &self,
        action: CatalogAction,
        specialty_id: Option<&str>,
        subspecialty_id: Option<&str>,
    ) -> bool {
        self.admin.permits_in(action, specialty_id, subspecialty_id)
    }

    /// The admin scope.
    pub fn admin_scope(&self) -> &AdminScope {
        &self.admin.scope
    }
}
