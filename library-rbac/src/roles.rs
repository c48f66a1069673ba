//! Administrative roles
//!
//! A profile's role gates catalog-management capability only. It says
//! nothing about whether the user may favorite, annotate or rate resources;
//! that is decided by the user type (see [`crate::user_types`]).

use serde::{Deserialize, Serialize};

/// Administrative tier of a profile.
///
/// Roles are ordered by reach:
/// User < SubspecialtyAdmin < SpecialtyAdmin < Admin < SuperAdmin
///
/// # Permission Model
///
/// - **User**: No catalog-management capability
/// - **SubspecialtyAdmin**: Curates the catalog of one subspecialty
/// - **SpecialtyAdmin**: Curates every subspecialty of one specialty
/// - **Admin**: Curates the whole catalog
/// - **SuperAdmin**: Curates the whole catalog and manages other users
///
/// # Examples
///
/// ```
/// use library_rbac::Role;
///
/// let role = Role::SpecialtyAdmin;
/// assert!(role.is_admin());
/// assert!(!role.can_manage_users());
///
/// assert!(!Role::User.is_admin());
/// assert!(Role::SuperAdmin.can_manage_users());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular library user
    User = 0,

    /// Administrator of a single subspecialty
    SubspecialtyAdmin = 1,

    /// Administrator of a specialty and all of its subspecialties
    SpecialtyAdmin = 2,

    /// Catalog-wide administrator
    Admin = 3,

    /// Catalog-wide administrator who can also manage users and roles
    SuperAdmin = 4,
}

impl Role {
    /// Check if this role carries any administrative capability.
    ///
    /// # Returns
    ///
    /// `true` for every role except `User`
    pub fn is_admin(&self) -> bool {
        *self >= Role::SubspecialtyAdmin
    }

    /// Check if this role may curate every subspecialty of the catalog.
    ///
    /// # Returns
    ///
    /// `true` for Admin and SuperAdmin
    pub fn has_global_reach(&self) -> bool {
        *self >= Role::Admin
    }

    /// Check if this role can manage companies and their rep contacts.
    pub fn can_manage_companies(&self) -> bool {
        *self >= Role::Admin
    }

    /// Check if this role can view the analytics dashboard.
    pub fn can_view_analytics(&self) -> bool {
        self.is_admin()
    }

    /// Check if this role can manage other users, including their roles.
    ///
    /// # Returns
    ///
    /// `true` only for SuperAdmin
    pub fn can_manage_users(&self) -> bool {
        *self >= Role::SuperAdmin
    }

    /// Parse role from string representation.
    ///
    /// Input is trimmed and compared case-insensitively.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse
    ///
    /// # Returns
    ///
    /// `Some(Role)` if valid, `None` otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use library_rbac::Role;
    ///
    /// assert_eq!(Role::parse("subspecialty_admin"), Some(Role::SubspecialtyAdmin));
    /// assert_eq!(Role::parse(" SUPER_ADMIN "), Some(Role::SuperAdmin));
    /// assert_eq!(Role::parse("owner"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "user" | "none" => Some(Self::User),
            "subspecialty_admin" | "subspecialty-admin" => Some(Self::SubspecialtyAdmin),
            "specialty_admin" | "specialty-admin" => Some(Self::SpecialtyAdmin),
            "admin" => Some(Self::Admin),
            "super_admin" | "super-admin" | "superadmin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    /// Get string representation of the role, as stored on the profile row.
    ///
    /// # Examples
    ///
    /// ```
    /// use library_rbac::Role;
    ///
    /// assert_eq!(Role::SpecialtyAdmin.as_str(), "specialty_admin");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::SubspecialtyAdmin => "subspecialty_admin",
            Self::SpecialtyAdmin => "specialty_admin",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::SubspecialtyAdmin => "Subspecialty Admin",
            Self::SpecialtyAdmin => "Specialty Admin",
            Self::Admin => "Admin",
            Self::SuperAdmin => "Super Admin",
        }
    }

    /// Get all roles, lowest reach first.
    pub fn all() -> Vec<Self> {
        vec![
            Self::User,
            Self::SubspecialtyAdmin,
            Self::SpecialtyAdmin,
            Self::Admin,
            Self::SuperAdmin,
        ]
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
