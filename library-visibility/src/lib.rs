//! # Library Visibility
//!
//! Decides what a profile sees in the surgical technique library and which
//! actions it is offered.
//!
//! ## Overview
//!
//! - **Scope**: The slice of the catalog visible to a profile, computed from
//!   its specialty and subspecialty with the Generalist and Podiatry rules
//! - **Gates**: `can_interact`, `is_admin`, `is_company_active` and
//!   `can_contact_rep`, plus [`Capabilities`] bundling them
//! - **Filtering**: Applying a scope to loaded categories and resources
//! - **Tracking**: Discarding resolutions made stale by a profile change
//!
//! ```text
//! Profile ──→ ScopeResolver ──(ReferenceLookup)──→ Scope ──→ visible_categories
//!    │                                                  └──→ visible_resources
//!    └──→ Capabilities (can_interact, is_admin, AdminGrant)
//! ```
//!
//! ## Failure Posture
//!
//! Nothing here returns an error. Unresolvable reference data widens the
//! scope to the whole catalog by default; [`FallbackPolicy::FailClosed`]
//! narrows it to nothing instead.
//!
//! ## Usage
//!
//! ```rust
//! use library_catalog::{Profile, Specialty, Subspecialty};
//! use library_visibility::{can_interact, resolve_scope, InMemoryReference};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let reference = InMemoryReference::new()
//!     .with_specialty(Specialty::new("ortho", "Orthopaedic Surgery"))
//!     .with_subspecialty(Subspecialty::new("gen-1", "Generalist", "ortho"));
//!
//! let profile = Profile::new("u1", "u1@example.com").with_subspecialty("gen-1");
//! let scope = resolve_scope(&profile, &reference).await;
//!
//! assert!(scope.load_all);
//! assert!(!can_interact(Some(&profile)));
//! # });
//! ```

pub mod config;
pub mod filter;
pub mod gates;
pub mod lookup;
pub mod scope;
pub mod tracker;

// Re-export main types for convenience
pub use config::{FallbackPolicy, ResolverConfig};
pub use gates::{
    can_contact_rep, can_interact, is_admin, is_company_active, profile_from_value, Capabilities,
};
pub use lookup::{InMemoryReference, LookupError, NamedRef, ReferenceLookup};
pub use scope::{resolve_scope, Scope, ScopeResolver};
pub use tracker::{ResolutionTicket, ScopeTracker};
