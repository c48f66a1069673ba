//! # Library Catalog
//!
//! Data model for the surgical technique library: who the user is, what
//! reference data classifies them, and what the catalog holds.
//!
//! ## Overview
//!
//! The library-catalog crate handles:
//! - **Profiles**: Role, user type and specialty placement, plus onboarding
//!   and settings mutation
//! - **Specialties**: Admin-curated specialty and subspecialty reference data
//! - **Categories**: Two-level category tree scoped to a subspecialty
//! - **Resources**: Videos, articles and documents, with ratings
//! - **Companies**: Industry companies, representative contacts and inquiries
//! - **Reorder**: Drag-and-drop position arithmetic for admins
//!
//! ## Architecture
//!
//! ```text
//! Specialty
//!   └─ Subspecialty
//!        ├─ Category (top level)
//!        │    ├─ Category (sub-category)
//!        │    └─ Resource ─→ Company ─→ RepContact (per subspecialty)
//!        └─ Profile (specialty_id / subspecialty_id)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use library_catalog::{OnboardingSubmission, Profile};
//! use library_rbac::UserType;
//!
//! let mut profile = Profile::new("user-1", "surgeon@example.com");
//! profile
//!     .complete_onboarding(OnboardingSubmission {
//!         user_type: Some(UserType::Surgeon),
//!         specialty_id: Some("ortho".to_string()),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//! assert!(profile.onboarding_complete);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support (enabled by default)

pub mod category;
pub mod company;
pub mod error;
pub mod profile;
pub mod reorder;
pub mod resource;
pub mod specialty;

// Re-export main types for convenience
pub use category::{Category, CategoryNode, CategoryTree};
pub use company::{ActiveCompanySet, Company, RepContact, RepInquiry};
pub use error::{CatalogError, CatalogResult};
pub use profile::{OnboardingSubmission, Profile, ProfileSettings};
pub use reorder::{move_item, DragSession, DropPosition, PositionUpdate, Positioned};
pub use resource::{Rating, RatingSummary, Resource, ResourceKind};
pub use specialty::{Specialty, Subspecialty};
