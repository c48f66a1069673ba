//! # Library Store
//!
//! REST client for the surgical technique library backend.
//!
//! ## Overview
//!
//! The library-store crate handles:
//! - **Configuration**: Backend URL, API keys and timeouts from the environment
//! - **Reference lookups**: [`RestReferenceLookup`] backs the visibility
//!   resolver with the `specialties` and `subspecialties` tables
//! - **Active companies**: Rep-contact queries for the contact-rep gate
//! - **Retries**: Exponential backoff for transient failures
//!
//! ## Usage
//!
//! ```rust,no_run
//! use library_catalog::Profile;
//! use library_store::{fetch_active_companies, RestReferenceLookup, StoreClient};
//! use library_visibility::ScopeResolver;
//!
//! async fn example(profile: &Profile) -> Result<(), library_store::StoreError> {
//!     let client = StoreClient::from_env()?;
//!     let resolver = ScopeResolver::new(RestReferenceLookup::new(client.clone()));
//!
//!     let scope = resolver.resolve_scope(profile).await;
//!     let active = fetch_active_companies(&client, &scope).await?;
//!     println!("{} companies reachable", active.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod companies;
pub mod config;
pub mod profiles;
pub mod query;
pub mod reference;
pub mod retry;

// Re-export main types
pub use client::{StoreClient, StoreError, StoreResult};
pub use companies::fetch_active_companies;
pub use config::{ConfigError, StoreConfig};
pub use profiles::fetch_profile;
pub use reference::RestReferenceLookup;
pub use retry::RetryConfig;
