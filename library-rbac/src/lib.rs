//! # Library RBAC
//!
//! Roles, user types and capability gating for the surgical technique
//! library.
//!
//! ## Overview
//!
//! Two independent axes classify every profile:
//! - **Role**: Administrative tier, gating catalog management
//! - **User type**: End-user category, gating interactive features
//!
//! ```text
//! Profile
//!   ├─ role ────────→ AdminGrant (role + AdminScope) ─→ CatalogAction
//!   └─ user_type ───→ Interaction (favorite, note, upcoming case, rate, suggest)
//! ```
//!
//! A super admin with no user type can manage the catalog but cannot
//! favorite a resource; a surgeon with no role can favorite but cannot
//! manage anything.
//!
//! ## Usage
//!
//! ```rust
//! use library_rbac::{AdminGrant, CatalogAction, Interaction, Role, UserType};
//!
//! let user_type = UserType::parse(" Surgeon ");
//! assert!(Interaction::Favorite.permitted_for(user_type));
//!
//! let grant = AdminGrant::new(Role::SpecialtyAdmin, Some("ortho"), None);
//! assert!(grant.permits_in(CatalogAction::CreateResource, Some("ortho"), Some("hand")));
//! ```
//!
//! ## Closed Types
//!
//! `Role` and `UserType` are closed enums. Stringly-typed profile data is
//! parsed into them once, where profiles are deserialized, so nothing
//! downstream re-validates raw strings.

pub mod admin;
pub mod interactions;
pub mod roles;
pub mod user_types;

// Re-export main types for convenience
pub use admin::{AdminGrant, AdminScope, CatalogAction};
pub use interactions::Interaction;
pub use roles::Role;
pub use user_types::UserType;
